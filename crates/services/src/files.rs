//! # File Handles
//!
//! [`FileHandle`] implementations: files on disk (CLI uploads) and in-memory
//! bodies (multipart uploads received by the local engine).

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use domains::{FileHandle, FileUpload};
use tokio::io::AsyncReadExt;

/// A regular file on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    size: u64,
    declared: Option<String>,
    modified: Option<DateTime<Utc>>,
}

impl DiskFile {
    /// Stats `path`. The declared type is guessed from the extension, the
    /// same way a browser fills in `File.type`.
    pub async fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let declared = mime_guess::from_path(&path).first_raw().map(str::to_string);

        Ok(Self {
            name,
            size: meta.len(),
            declared,
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            path,
        })
    }

    /// Overrides the guessed MIME type (`None` clears it).
    pub fn with_declared_type(mut self, mime_type: Option<String>) -> Self {
        self.declared = mime_type;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `file://` reference used while an upload is pending or failed.
    pub async fn local_reference(&self) -> String {
        let absolute = tokio::fs::canonicalize(&self.path)
            .await
            .unwrap_or_else(|_| self.path.clone());
        format!("file://{}", absolute.display())
    }
}

#[async_trait]
impl FileHandle for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn declared_type(&self) -> Option<&str> {
        self.declared.as_deref()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    async fn read_head(&self, len: usize) -> io::Result<Bytes> {
        let file = tokio::fs::File::open(&self.path).await?;
        let mut buf = Vec::with_capacity(len.min(self.size as usize));
        file.take(len as u64).read_to_end(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    async fn read_all(&self) -> io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }
}

/// A file already held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    declared: Option<String>,
    body: Bytes,
    modified: Option<DateTime<Utc>>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, declared: Option<String>, body: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            declared: declared.filter(|t| !t.trim().is_empty()),
            body: body.into(),
            modified: None,
        }
    }

    pub fn with_last_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl From<FileUpload> for MemoryFile {
    fn from(upload: FileUpload) -> Self {
        MemoryFile::new(upload.name, Some(upload.mime_type), upload.body)
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.body.len() as u64
    }

    fn declared_type(&self) -> Option<&str> {
        self.declared.as_deref()
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    async fn read_head(&self, len: usize) -> io::Result<Bytes> {
        Ok(self.body.slice(..len.min(self.body.len())))
    }

    async fn read_all(&self) -> io::Result<Bytes> {
        Ok(self.body.clone())
    }
}
