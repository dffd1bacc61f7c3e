//! Builds services and adapters from [`AppConfig`].

use std::sync::Arc;

use ai_adapters::{GeminiClient, HttpLocalProbe};
use anyhow::{Context, Result};
use auth_adapters::{HostedUiClient, HostedUiConfig, StaticToken};
use configs::AppConfig;
use domains::{GenerativeModel, TokenProvider, User};
use services::{ItemBoard, ThreatAnalyzer};
use storage_adapters::{HttpItemCatalog, PresignedImageStore};
use tracing::{info, warn};

pub struct App {
    pub config: AppConfig,
    pub tokens: Option<Arc<dyn TokenProvider>>,
}

impl App {
    pub fn new(config: AppConfig, token: Option<String>) -> Self {
        let tokens = token
            .filter(|t| !t.trim().is_empty())
            .map(|t| Arc::new(StaticToken::new(t)) as Arc<dyn TokenProvider>);
        Self { config, tokens }
    }

    pub fn model(&self) -> Arc<dyn GenerativeModel> {
        Arc::new(
            GeminiClient::new(self.config.ai.api_key.clone())
                .with_endpoint(self.config.ai.endpoint.clone())
                .with_model(self.config.ai.model.clone()),
        )
    }

    pub fn analyzer(&self, use_local: bool) -> ThreatAnalyzer {
        let analyzer = ThreatAnalyzer::new(self.model()).with_temperature(self.config.ai.temperature);
        if !use_local {
            return analyzer;
        }
        analyzer
            .with_local_probe(Arc::new(HttpLocalProbe::new(self.config.engine.url.clone())))
            .with_probe_timeout(self.config.probe_timeout())
    }

    pub fn board(&self) -> ItemBoard {
        let base = self.config.api_base_url.as_deref();
        let mut catalog = HttpItemCatalog::new(base);
        let mut images = PresignedImageStore::new(base);
        if let Some(tokens) = &self.tokens {
            catalog = catalog.with_token_provider(Arc::clone(tokens));
            images = images.with_token_provider(Arc::clone(tokens));
        }
        if catalog.base_url().is_none() {
            warn!("api_base_url is not configured, catalog changes stay local");
        }
        ItemBoard::new(Arc::new(catalog)).with_image_store(Arc::new(images))
    }

    pub fn hosted_ui(&self) -> Result<HostedUiClient> {
        let auth = &self.config.auth;
        if !auth.is_configured() {
            anyhow::bail!("identity provider not configured: set LOSTIT_AUTH__DOMAIN and LOSTIT_AUTH__CLIENT_ID");
        }
        Ok(HostedUiClient::new(HostedUiConfig {
            domain: auth.domain.clone().unwrap_or_default(),
            client_id: auth.client_id.clone().unwrap_or_default(),
            region: auth.region.clone().unwrap_or_default(),
            user_pool_id: auth.user_pool_id.clone().unwrap_or_default(),
            redirect_uri: auth.redirect_uri.clone(),
            scopes: auth.scope_list(),
        }))
    }

    /// The signed-in user behind `--token`, looked up at the user-info endpoint.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let Some(tokens) = &self.tokens else {
            return Ok(None);
        };
        let Some(token) = tokens.bearer_token().await else {
            return Ok(None);
        };
        let client = self.hosted_ui()?;
        let profile = client
            .user_info(&token)
            .await
            .context("could not resolve the user behind --token")?;
        let user = profile.to_user();
        info!(user_id = %user.id, "authenticated");
        Ok(Some(user))
    }

    /// Like [`App::current_user`] but sign-in is mandatory.
    pub async fn require_user(&self) -> Result<User> {
        self.current_user()
            .await?
            .context("sign in first: run `lostit auth login-url`, then pass --token")
    }
}

