//! # Local Engine Probe
//!
//! Client side of `POST {engine}/analyze`. Every failure collapses to `None`
//! so the classifier can fall through to the cloud model.

use async_trait::async_trait;
use domains::{FileUpload, LocalAnalysisProbe};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:5000";

#[derive(Debug, Deserialize)]
struct EngineReply {
    analysis: String,
}

pub struct HttpLocalProbe {
    client: Client,
    base_url: String,
}

impl HttpLocalProbe {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url)
    }
}

impl Default for HttpLocalProbe {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_URL)
    }
}

#[async_trait]
impl LocalAnalysisProbe for HttpLocalProbe {
    async fn analyze(&self, upload: &FileUpload) -> Option<String> {
        let part = match Part::bytes(upload.body.to_vec())
            .file_name(upload.name.clone())
            .mime_str(&upload.mime_type)
        {
            Ok(part) => part,
            Err(e) => {
                debug!(error = %e, "invalid MIME type for local engine upload");
                return None;
            }
        };
        let form = Form::new().part("file", part);

        let response = match self.client.post(self.analyze_url()).multipart(form).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "local engine unreachable");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(status = response.status().as_u16(), "local engine declined");
            return None;
        }
        match response.json::<EngineReply>().await {
            Ok(reply) => Some(reply.analysis),
            Err(e) => {
                debug!(error = %e, "local engine reply missing `analysis`");
                None
            }
        }
    }
}
