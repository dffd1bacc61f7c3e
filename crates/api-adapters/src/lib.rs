//! # api-adapters
//!
//! HTTP surface of the local analysis engine, behind the default `web-axum` feature.

#[cfg(feature = "web-axum")]
pub mod engine;

#[cfg(feature = "web-axum")]
pub use engine::{router, AnalyzeReply, EngineError, EngineState, MAX_UPLOAD_BYTES};
