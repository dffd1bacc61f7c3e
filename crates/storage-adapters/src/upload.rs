//! # Presigned Image Upload
//!
//! Two-step handshake: ask the backend for a presigned URL with
//! `POST /upload-url`, then `PUT` the raw body to it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domains::{CatalogError, FileUpload, ImageStore, TokenProvider};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::base_url::{normalize_base_url, with_bearer};
use crate::catalog::{ensure_success, network_error};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadTicketRequest<'a> {
    file_name: String,
    file_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadTicket {
    upload_url: String,
    view_url: String,
}

/// Object key for an upload: `uploads/<millis>-<name>` with whitespace replaced by `_`.
pub fn object_key(file_name: &str, millis: i64) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("uploads/{millis}-{safe}")
}

pub struct PresignedImageStore {
    client: Client,
    base_url: Option<String>,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl PresignedImageStore {
    pub fn new(base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url),
            tokens: None,
        }
    }

    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

#[async_trait]
impl ImageStore for PresignedImageStore {
    #[instrument(skip_all, fields(image = %upload.name))]
    async fn upload(&self, upload: &FileUpload) -> Result<String, CatalogError> {
        let base = self.base_url.as_deref().ok_or(CatalogError::NotConfigured)?;

        // 1. Handshake
        let ticket_request = UploadTicketRequest {
            file_name: object_key(&upload.name, Utc::now().timestamp_millis()),
            file_type: &upload.mime_type,
        };
        let request = self
            .client
            .post(format!("{base}/upload-url"))
            .json(&ticket_request);
        let response = with_bearer(request, self.tokens.as_ref())
            .await
            .send()
            .await
            .map_err(network_error)?;
        let ticket: UploadTicket = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        // 2. Direct PUT to object storage, no bearer token
        let response = self
            .client
            .put(&ticket.upload_url)
            .header(header::CONTENT_TYPE, &upload.mime_type)
            .body(upload.body.clone())
            .send()
            .await
            .map_err(network_error)?;
        ensure_success(response).await?;

        info!(key = %ticket_request.file_name, "image uploaded");
        Ok(ticket.view_url)
    }
}
