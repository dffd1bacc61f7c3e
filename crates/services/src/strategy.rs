//! # Media Strategy Selector
//!
//! Decides what part of a file goes to the cloud classifier. Text wins over
//! media: a file matching both rules is always sent as text.

use std::borrow::Cow;

use base64::Engine;
use domains::{FileHandle, FileMetadata, MediaStrategy, Part};
use mime::Mime;

use crate::triage::ExtractError;

/// Character ceiling for text payloads.
pub const TEXT_CHAR_LIMIT: usize = 100_000;

/// Appended after the kept prefix when a text payload is cut.
pub const TRUNCATION_MARKER: &str = "\n...(truncated)...";

/// Source, config and markup extensions always treated as text.
pub const CODE_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "csv", "xml", "html", "css", "js", "jsx", "ts", "tsx", "py", "java", "c",
    "cpp", "h", "cs", "go", "rs", "php", "rb", "sh", "bat", "ps1", "yaml", "yml", "ini", "cfg",
    "conf", "log",
];

/// MIME types the classifier accepts as inline binary parts.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
    "application/pdf",
    "audio/wav",
    "audio/mp3",
    "audio/aiff",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
    "video/mp4",
    "video/mpeg",
    "video/mov",
    "video/avi",
    "video/x-flv",
    "video/mpg",
    "video/webm",
    "video/wmv",
    "video/3gpp",
];

/// Lowercased `type/subtype` without parameters.
fn essence(mime_type: &str) -> String {
    mime_type
        .parse::<Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .unwrap_or_else(|_| mime_type.trim().to_ascii_lowercase())
}

pub fn is_text_like(mime_type: &str, extension: &str) -> bool {
    essence(mime_type).starts_with("text/") || CODE_EXTENSIONS.contains(&extension)
}

pub fn is_supported_media(mime_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES.contains(&essence(mime_type).as_str())
}

pub fn select_strategy(metadata: &FileMetadata) -> MediaStrategy {
    if is_text_like(&metadata.mime_type, &metadata.extension) {
        MediaStrategy::Text
    } else if is_supported_media(&metadata.mime_type) {
        MediaStrategy::Media
    } else {
        MediaStrategy::MetadataOnly
    }
}

/// Cuts `text` to [`TEXT_CHAR_LIMIT`] characters plus [`TRUNCATION_MARKER`].
/// Shorter input is returned untouched.
pub fn truncate_text(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(TEXT_CHAR_LIMIT) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Reads whatever the strategy needs and builds the user-turn parts.
pub async fn build_parts<F>(
    file: &F,
    metadata: &FileMetadata,
    strategy: MediaStrategy,
) -> Result<Vec<Part>, ExtractError>
where
    F: FileHandle + ?Sized,
{
    let parts = match strategy {
        MediaStrategy::Text => {
            let body = file.read_all().await?;
            let text = String::from_utf8_lossy(&body);
            vec![Part::text(format!(
                "Analyze this file content:\n\n{}",
                truncate_text(&text)
            ))]
        }
        MediaStrategy::Media => {
            let body = file.read_all().await?;
            vec![
                Part::InlineData {
                    mime_type: essence(&metadata.mime_type),
                    data: base64::engine::general_purpose::STANDARD.encode(&body),
                },
                Part::text("Analyze this media file for visual anomalies or embedded threats."),
            ]
        }
        // The body is never read: unsupported inline types make the model reject the call.
        MediaStrategy::MetadataOnly => vec![Part::text(format!(
            "The file '{}' is a binary format ({}) that cannot be fully uploaded for content \
             inspection. Perform analysis strictly based on the provided magic bytes ({}) and \
             file extension characteristics.",
            metadata.name, metadata.mime_type, metadata.magic_bytes
        ))],
    };
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::MemoryFile;
    use crate::triage::extract_metadata;

    fn meta(name: &str, mime_type: &str) -> FileMetadata {
        FileMetadata {
            name: name.to_string(),
            size: 0,
            mime_type: mime_type.to_string(),
            extension: crate::triage::get_extension(name),
            magic_bytes: String::new(),
            last_modified: None,
        }
    }

    #[test]
    fn text_prefix_beats_image_extension() {
        assert_eq!(select_strategy(&meta("photo.jpg", "text/plain")), MediaStrategy::Text);
    }

    #[test]
    fn code_extension_beats_media_type() {
        // Both rules match; text is evaluated first.
        assert_eq!(select_strategy(&meta("notes.txt", "image/png")), MediaStrategy::Text);
    }

    #[test]
    fn media_and_metadata_only() {
        assert_eq!(select_strategy(&meta("pic.png", "image/png")), MediaStrategy::Media);
        assert_eq!(select_strategy(&meta("doc.pdf", "application/pdf")), MediaStrategy::Media);
        assert_eq!(
            select_strategy(&meta("blob.bin", "application/x-unknown")),
            MediaStrategy::MetadataOnly
        );
    }

    #[test]
    fn mime_parameters_and_case_are_ignored() {
        assert_eq!(select_strategy(&meta("a.dat", "Text/HTML; charset=utf-8")), MediaStrategy::Text);
        assert_eq!(select_strategy(&meta("a.dat", "IMAGE/PNG")), MediaStrategy::Media);
    }

    #[test]
    fn long_text_is_truncated_to_limit() {
        let text = "a".repeat(150_000);
        let cut = truncate_text(&text);
        let kept = cut.strip_suffix(TRUNCATION_MARKER).expect("marker appended");
        assert_eq!(kept.chars().count(), TEXT_CHAR_LIMIT);
    }

    #[test]
    fn text_at_or_below_limit_is_untouched() {
        let exact = "é".repeat(TEXT_CHAR_LIMIT);
        assert!(matches!(truncate_text(&exact), Cow::Borrowed(_)));
        assert_eq!(truncate_text("short"), "short");
    }

    #[tokio::test]
    async fn media_parts_carry_base64_body() {
        let file = MemoryFile::new("pic.png", Some("image/png".into()), vec![1u8, 2, 3]);
        let metadata = extract_metadata(&file).await.unwrap();
        let parts = build_parts(&file, &metadata, MediaStrategy::Media).await.unwrap();

        match &parts[0] {
            Part::InlineData { mime_type, data } => {
                assert_eq!(mime_type, "image/png");
                assert_eq!(data, "AQID");
            }
            other => panic!("expected inline data, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn metadata_only_mentions_magic_bytes() {
        let file = MemoryFile::new("fw.img", None, vec![0x27, 0x05, 0x19, 0x56]);
        let metadata = extract_metadata(&file).await.unwrap();
        let parts = build_parts(&file, &metadata, MediaStrategy::MetadataOnly).await.unwrap();

        assert_eq!(parts.len(), 1);
        match &parts[0] {
            Part::Text(text) => {
                assert!(text.contains("27 05 19 56"));
                assert!(text.contains("fw.img"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
