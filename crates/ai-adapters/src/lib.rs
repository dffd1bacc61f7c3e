//! # ai-adapters
//!
//! HTTP implementations of the classifier ports: the cloud generative model
//! and the local analysis engine probe.

pub mod gemini;
pub mod local;

pub use gemini::{classify_failure, GeminiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use local::{HttpLocalProbe, DEFAULT_ENGINE_URL};
