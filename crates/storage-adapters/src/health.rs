//! Backend connectivity diagnostic.

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::base_url::normalize_base_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendHealth {
    pub status: bool,
    /// `URL_NOT_CONFIGURED`, `HTTP_<code>` or `CORS_OR_NETWORK_ERROR` when `status` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BackendHealth {
    fn down(reason: impl Into<String>) -> Self {
        Self {
            status: false,
            reason: Some(reason.into()),
        }
    }
}

/// Probes `GET {base}/items` without credentials.
pub async fn check_backend_health(client: &Client, base_url: Option<&str>) -> BackendHealth {
    let Some(base) = normalize_base_url(base_url) else {
        return BackendHealth::down("URL_NOT_CONFIGURED");
    };
    match client.get(format!("{base}/items")).send().await {
        Ok(r) if r.status().is_success() => BackendHealth { status: true, reason: None },
        Ok(r) => BackendHealth::down(format!("HTTP_{}", r.status().as_u16())),
        Err(e) => {
            debug!(error = %e, "backend health probe failed");
            BackendHealth::down("CORS_OR_NETWORK_ERROR")
        }
    }
}
