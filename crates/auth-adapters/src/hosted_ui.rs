//! # Hosted UI
//!
//! Authorization-code flow against the identity provider's hosted login
//! page:
//! 1. send the user to [`HostedUiConfig::login_url`];
//! 2. read `code` (or `error`) from the redirect with [`parse_callback`];
//! 3. trade the code for tokens with [`HostedUiClient::exchange_code`];
//! 4. fetch profile claims with [`HostedUiClient::user_info`].

use reqwest::{header, Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::errors::AuthError;
use crate::profile::UserProfile;

/// Identity provider settings. Nothing here has a production default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedUiConfig {
    /// Hosted UI domain, with or without scheme.
    pub domain: String,
    pub client_id: String,
    pub region: String,
    pub user_pool_id: String,
    /// Where the provider sends the user after login and logout.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl HostedUiConfig {
    /// `https://<domain>` unless the domain already carries a scheme.
    pub fn base_url(&self) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        if domain.starts_with("http") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// OIDC issuer for the user pool.
    pub fn authority(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    pub fn login_url(&self) -> Result<Url, AuthError> {
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &format!("{}/login", self.base_url()),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    pub fn logout_url(&self) -> Result<Url, AuthError> {
        Url::parse_with_params(
            &format!("{}/logout", self.base_url()),
            &[
                ("client_id", self.client_id.as_str()),
                ("logout_uri", self.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.base_url())
    }

    fn user_info_url(&self) -> String {
        format!("{}/oauth2/userInfo", self.base_url())
    }
}

/// Reads the redirect back from the hosted UI. Accepts a full URL or a bare
/// query string. `Ok(None)` means the redirect carried neither `code` nor `error`.
pub fn parse_callback(redirect: &str) -> Result<Option<String>, AuthError> {
    let redirect = redirect.trim();
    let url = match Url::parse(redirect) {
        Ok(url) => url,
        Err(_) => Url::parse(&format!("http://callback/?{}", redirect.trim_start_matches('?')))
            .map_err(|e| AuthError::InvalidUrl(e.to_string()))?,
    };

    let mut code = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        warn!(%error, "identity provider returned an error");
        return Err(AuthError::Callback { error, description });
    }
    Ok(code)
}

/// Tokens returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenSet {
    pub access_token: SecretString,
    #[serde(default)]
    pub id_token: Option<SecretString>,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

pub struct HostedUiClient {
    client: Client,
    config: HostedUiConfig,
}

impl HostedUiClient {
    pub fn new(config: HostedUiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &HostedUiConfig {
        &self.config
    }

    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let response = self
            .client
            .post(self.config.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange {
                status: status.as_u16(),
                body,
            });
        }
        let tokens: TokenSet = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        debug!(expires_in = ?tokens.expires_in, "exchanged authorization code");
        Ok(tokens)
    }

    #[instrument(skip_all)]
    pub async fn user_info(&self, access_token: &SecretString) -> Result<UserProfile, AuthError> {
        let response = self
            .client
            .get(self.config.user_info_url())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", access_token.expose_secret()),
            )
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::UserInfo(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }
}
