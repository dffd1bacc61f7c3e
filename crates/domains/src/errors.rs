//! # Domain Errors
//!
//! Failure types shared across services and adapters. Each enum maps to one
//! class of the error taxonomy: classifier availability, catalog persistence,
//! and claim-workflow policy.

use thiserror::Error;

use crate::items::ItemStatus;

/// Failure surfaced by the cloud classifier. Exactly one variant reaches the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The model rejected the inline media type.
    #[error("The AI model does not support this file's media format.")]
    UnsupportedMedia,

    /// Missing, invalid or expired API key.
    #[error("API key invalid or expired: {0}")]
    InvalidCredential(String),

    #[error("File size exceeds analysis limit.")]
    PayloadTooLarge,

    /// Network failure, empty response or any other upstream error.
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),
}

/// Failure talking to the remote item catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("backend URL not configured")]
    NotConfigured,

    /// Connection refused, DNS, TLS or CORS-style failures.
    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("malformed catalog response: {0}")]
    Decode(String),
}

impl CatalogError {
    /// Short machine-readable reason, as recorded when demo data is substituted.
    pub fn reason(&self) -> String {
        match self {
            CatalogError::NotConfigured => "URL_NOT_CONFIGURED".to_string(),
            CatalogError::Network(_) => "CORS_OR_NETWORK_ERROR".to_string(),
            CatalogError::Status { status, .. } => format!("HTTP_{status}"),
            CatalogError::Decode(_) => "MALFORMED_RESPONSE".to_string(),
        }
    }
}

/// Policy violations of the claim workflow, detected before any mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Caller must sign in first; the view redirects to the login prompt.
    #[error("sign in to claim this item")]
    AuthenticationRequired,

    #[error("item {0} not found")]
    NotFound(String),

    #[error("you cannot claim an item you reported")]
    OwnItem,

    #[error("item is {0} and cannot be claimed")]
    NotClaimable(ItemStatus),

    #[error("only the reporting user may do this")]
    NotOwner,

    #[error("item is {0}, only CLAIMED items can be resolved")]
    NotClaimed(ItemStatus),
}
