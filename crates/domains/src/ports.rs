//! # Ports
//!
//! Traits the services depend on. Adapter crates implement them; tests use
//! the mockall doubles exported under the `testing` feature.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::errors::{CatalogError, ClassifierError};
use crate::items::Item;
use crate::models::GenerationRequest;

/// A file body ready to be posted somewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub body: Bytes,
}

/// A readable file whose header can be read without loading the whole body.
#[async_trait]
pub trait FileHandle: Send + Sync {
    fn name(&self) -> &str;
    fn size(&self) -> u64;
    /// MIME type declared by the source, if any.
    fn declared_type(&self) -> Option<&str>;
    fn last_modified(&self) -> Option<DateTime<Utc>>;
    /// Reads at most `len` bytes from the start of the file.
    async fn read_head(&self, len: usize) -> std::io::Result<Bytes>;
    async fn read_all(&self) -> std::io::Result<Bytes>;
}

/// Content-generation endpoint. Returns the raw response text.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ClassifierError>;
}

/// The local analysis engine. `None` means "not available, fall through".
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LocalAnalysisProbe: Send + Sync {
    /// Posts the raw file and returns the engine's `analysis` string.
    async fn analyze(&self, upload: &FileUpload) -> Option<String>;
}

/// Remote durable store of items.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, CatalogError>;
    async fn create(&self, item: &Item) -> Result<Item, CatalogError>;
    async fn delete(&self, id: &str) -> Result<(), CatalogError>;
    async fn claim(&self, id: &str) -> Result<(), CatalogError>;
}

/// Object storage reached through a presigned-URL handshake.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads the image and returns its public view URL.
    async fn upload(&self, upload: &FileUpload) -> Result<String, CatalogError>;
}

/// Supplies the bearer credential attached to catalog calls.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `None` means the call proceeds unauthenticated.
    async fn bearer_token(&self) -> Option<SecretString>;
}
