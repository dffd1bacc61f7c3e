//! # Local Analysis Engine
//!
//! The HTTP service the classifier probes before calling the cloud model.
//!
//! | Route | Body | Reply |
//! |---|---|---|
//! | `POST /analyze` | multipart, field `file` | `{ "analysis": "<AnalysisResult JSON>" }` |
//! | `GET /health` | none | `{ "status": "ok" }` |

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use domains::DEFAULT_MIME;
use serde::Serialize;
use serde_json::json;
use services::files::MemoryFile;
use services::heuristics::assess;
use services::triage::extract_metadata;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

/// Largest upload the engine accepts.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct EngineState {
    pub max_upload_bytes: usize,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("multipart field `file` is required")]
    MissingFile,

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("analysis failed: {0}")]
    Internal(String),
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match self {
            EngineError::MissingFile | EngineError::Multipart(_) => StatusCode::BAD_REQUEST,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReply {
    /// Serialized `AnalysisResult`, the same contract the cloud model answers with.
    pub analysis: String,
}

struct Upload {
    name: String,
    mime_type: Option<String>,
    body: Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Upload, EngineError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EngineError::Multipart(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .filter(|t| *t != DEFAULT_MIME)
            .map(str::to_string);
        let body = field
            .bytes()
            .await
            .map_err(|e| EngineError::Multipart(e.body_text()))?;
        return Ok(Upload { name, mime_type, body });
    }
    Err(EngineError::MissingFile)
}

#[instrument(skip_all)]
async fn analyze(
    State(_state): State<EngineState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeReply>, EngineError> {
    // 1. Pull the file out of the form
    let upload = read_file_field(&mut multipart).await?;
    let body = upload.body.clone();
    let file = MemoryFile::new(upload.name, upload.mime_type, upload.body);

    // 2. Same metadata the classifier works from
    let metadata = extract_metadata(&file)
        .await
        .map_err(|e| EngineError::Internal(e.to_string()))?;

    // 3. Rule engine
    let result = assess(&metadata, &body);
    info!(file = %metadata.name, level = %result.threat_level, score = result.score, "analyzed");

    let analysis = serde_json::to_string(&result).map_err(|e| EngineError::Internal(e.to_string()))?;
    Ok(Json(AnalyzeReply { analysis }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the engine router with tracing and a browser-friendly CORS policy.
pub fn router(state: EngineState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
