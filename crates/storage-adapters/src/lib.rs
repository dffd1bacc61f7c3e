//! # storage-adapters
//!
//! HTTP clients for the item catalog backend: the REST catalog, the
//! presigned image upload and a connectivity check.

pub mod base_url;
pub mod catalog;
pub mod health;
pub mod upload;

pub use base_url::normalize_base_url;
pub use catalog::HttpItemCatalog;
pub use health::{check_backend_health, BackendHealth};
pub use upload::{object_key, PresignedImageStore};
