//! # Metadata Extractor
//!
//! Computes [`FileMetadata`] for an upload. Only the first
//! [`HEADER_BYTES`] bytes are read, whatever the file size.

use domains::{FileHandle, FileMetadata, DEFAULT_MIME, HEADER_BYTES};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
}

/// Lowercased text after the final `.`; empty when there is no dot or the
/// only dot is the leading one of a hidden file.
pub fn get_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        None | Some(0) => String::new(),
        Some(idx) => file_name[idx + 1..].to_lowercase(),
    }
}

/// Uppercase hex pairs separated by single spaces.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn extract_metadata<F>(file: &F) -> Result<FileMetadata, ExtractError>
where
    F: FileHandle + ?Sized,
{
    let head = file.read_head(HEADER_BYTES).await?;
    let mime_type = file
        .declared_type()
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_MIME)
        .to_string();

    debug!(file = file.name(), header_len = head.len(), %mime_type, "extracted metadata");

    Ok(FileMetadata {
        name: file.name().to_string(),
        size: file.size(),
        mime_type,
        extension: get_extension(file.name()),
        magic_bytes: hex_dump(&head),
        last_modified: file.last_modified(),
    })
}

/// Human-readable size: `0 Bytes`, `1.5 KB`, `3.21 MB`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    let mut rendered = format!("{value:.decimals$}");
    if rendered.contains('.') {
        rendered = rendered.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{rendered} {}", UNITS[exponent])
}
