//! # configs
//!
//! Application settings, layered in this order (later wins):
//! 1. built-in defaults;
//! 2. an optional `lostit.toml` in the working directory;
//! 3. `LOSTIT_*` environment variables, nested keys joined with `__`
//!    (`LOSTIT_AI__API_KEY`), after `.env` has been loaded.
//!
//! The catalog URL and identity-provider settings have no defaults.

use std::collections::HashMap;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "LOSTIT";
pub const CONFIG_FILE: &str = "lostit";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Item catalog backend. Absent means the catalog runs unconfigured.
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    /// Model for file classification.
    pub model: String,
    pub tagging_model: Option<String>,
    pub chat_model: Option<String>,
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            tagging_model: None,
            chat_model: None,
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the classifier probes the local engine.
    pub url: String,
    pub probe_timeout_ms: u64,
    /// Listen address for `lostit engine`.
    pub bind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            probe_timeout_ms: 3000,
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub region: Option<String>,
    pub user_pool_id: Option<String>,
    pub redirect_uri: String,
    /// Space-separated OAuth scopes.
    pub scopes: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: None,
            client_id: None,
            region: None,
            user_pool_id: None,
            redirect_uri: "http://localhost:3000".to_string(),
            scopes: "openid email profile".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn scope_list(&self) -> Vec<String> {
        self.scopes.split_whitespace().map(str::to_string).collect()
    }

    /// True when the hosted UI can be reached: domain and client id are set.
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.domain) && set(&self.client_id)
    }
}

impl AppConfig {
    /// Loads `.env`, then `lostit.toml` (optional), then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(environment())
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Builds from an in-memory TOML document and variable map instead of the
    /// filesystem and process environment.
    pub fn from_sources(toml: Option<&str>, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(toml) = toml {
            builder = builder.add_source(File::from_str(toml, FileFormat::Toml));
        }
        let config = builder.add_source(environment().source(Some(vars))).build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn probe_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.engine.probe_timeout_ms)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}
