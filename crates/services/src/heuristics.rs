//! # Heuristic Rule Engine
//!
//! Deterministic implementation of the classifier's decision policy, used by
//! the local analysis engine. It looks at the header signature, the
//! extension and, for text, the content itself.

use domains::{AnalysisResult, FileMetadata, ThreatLevel};

use crate::strategy::{truncate_text, CODE_EXTENSIONS, SUPPORTED_MEDIA_TYPES, TEXT_CHAR_LIMIT};
use crate::triage::get_extension;

/// Known header signature.
#[derive(Debug)]
struct Signature {
    name: &'static str,
    magic: &'static [u8],
    /// Extensions consistent with this header.
    extensions: &'static [&'static str],
    executable: bool,
}

const SIGNATURES: &[Signature] = &[
    Signature { name: "PNG image", magic: &[0x89, b'P', b'N', b'G'], extensions: &["png"], executable: false },
    Signature { name: "JPEG image", magic: &[0xFF, 0xD8, 0xFF], extensions: &["jpg", "jpeg", "jfif"], executable: false },
    Signature { name: "GIF image", magic: b"GIF8", extensions: &["gif"], executable: false },
    Signature { name: "PDF document", magic: b"%PDF", extensions: &["pdf"], executable: false },
    Signature {
        name: "ZIP container",
        magic: &[b'P', b'K', 0x03, 0x04],
        extensions: &["zip", "docx", "xlsx", "pptx", "odt", "jar", "apk", "epub"],
        executable: false,
    },
    Signature { name: "RIFF container", magic: b"RIFF", extensions: &["webp", "wav", "avi"], executable: false },
    Signature { name: "Windows PE executable", magic: b"MZ", extensions: &["exe", "dll", "sys", "scr", "com"], executable: true },
    Signature { name: "ELF executable", magic: &[0x7F, b'E', b'L', b'F'], extensions: &["", "so", "elf", "bin", "o"], executable: true },
    Signature { name: "Mach-O executable", magic: &[0xCF, 0xFA, 0xED, 0xFE], extensions: &["", "dylib", "bundle"], executable: true },
];

/// Binary extensions not covered by a signature or a media type.
const BINARY_ONLY_EXTENSIONS: &[&str] = &[
    "bmp", "ico", "tif", "tiff", "heic", "heif", "msi", "7z", "rar", "gz", "tgz", "iso", "dmg",
];

const SCRIPT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "mjs", "py", "bat", "cmd", "ps1", "sh", "bash", "vbs", "php", "rb", "pl",
];

/// Lowercase needle, label, whether it is destructive on its own.
const INDICATORS: &[(&str, &str, bool)] = &[
    ("eval(", "dynamic evaluation via eval()", false),
    ("atob(", "base64 decoding via atob()", false),
    ("fromcharcode", "character-code string assembly", false),
    ("new function(", "Function constructor", false),
    ("base64_decode(", "base64_decode() payload", false),
    ("frombase64string", "FromBase64String() payload", false),
    ("-encodedcommand", "encoded PowerShell command", true),
    ("powershell -enc", "encoded PowerShell command", true),
    ("rm -rf", "recursive forced deletion (rm -rf)", true),
    ("system32", "references to system32", true),
    ("del /f", "forced deletion (del /f)", true),
    ("format c:", "disk format command", true),
    ("mkfs", "filesystem creation (mkfs)", true),
    (":(){ :|:& };:", "fork bomb", true),
];

/// Threshold for `\xNN` escapes before a script counts as hex-obfuscated.
const HEX_ESCAPE_THRESHOLD: usize = 24;

/// Bytes of the header inspected for "looks like text".
const TEXT_SNIFF_LEN: usize = 512;

const DOS_STUB: &[u8] = b"This program cannot be run in DOS mode";

fn detect_signature(head: &[u8]) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| head.starts_with(s.magic))
}

/// True when the sniffed prefix is readable text (UTF-8, no control bytes
/// besides whitespace). A multi-byte character cut at the end is tolerated.
fn looks_like_text(head: &[u8]) -> bool {
    let sample = &head[..head.len().min(TEXT_SNIFF_LEN)];
    if sample.is_empty() {
        return false;
    }
    let valid = match std::str::from_utf8(sample) {
        Ok(s) => s,
        Err(e) if e.error_len().is_none() => {
            // Truncated trailing character.
            match std::str::from_utf8(&sample[..e.valid_up_to()]) {
                Ok(s) => s,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };
    valid
        .chars()
        .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t' | '\u{0c}'))
}

/// True when `ext` names a binary format, so a text header under it is a disguise.
/// The family is drawn from the signature table, the classifier's media types
/// and the registered image/audio/video types. Text formats never count.
fn is_binary_extension(ext: &str) -> bool {
    if ext.is_empty() || CODE_EXTENSIONS.contains(&ext) || SCRIPT_EXTENSIONS.contains(&ext) {
        return false;
    }
    if BINARY_ONLY_EXTENSIONS.contains(&ext) || SIGNATURES.iter().any(|s| s.extensions.contains(&ext)) {
        return true;
    }
    mime_guess::from_ext(ext).iter().any(|m| {
        let top = m.type_();
        let media = (top == mime::IMAGE || top == mime::AUDIO || top == mime::VIDEO) && m.suffix() != Some(mime::XML);
        media || SUPPORTED_MEDIA_TYPES.contains(&m.essence_str())
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn verdict(level: ThreatLevel, score: u8, summary: String, details: Vec<String>) -> AnalysisResult {
    let recommendation = match level {
        ThreatLevel::Safe => "No action needed.",
        ThreatLevel::Suspicious => "Do not open or execute the file until its origin is verified.",
        ThreatLevel::Dangerous => "Delete the file and do not open or execute it.",
        ThreatLevel::Unknown => "Please try re-uploading the file.",
    };
    AnalysisResult {
        threat_level: level,
        score,
        summary,
        technical_details: details,
        recommendation: recommendation.to_string(),
    }
}

/// Assesses a file from its metadata and full body.
pub fn assess(metadata: &FileMetadata, body: &[u8]) -> AnalysisResult {
    let ext = if metadata.extension.is_empty() {
        get_extension(&metadata.name)
    } else {
        metadata.extension.clone()
    };
    if body.is_empty() {
        return verdict(
            ThreatLevel::Safe,
            0,
            "Empty file.".to_string(),
            vec!["File has no content".to_string()],
        );
    }

    let signature = detect_signature(body);
    let binary_ext = is_binary_extension(&ext);
    let textual = signature.is_none() && looks_like_text(body);

    let mut details = vec![format!(
        "Header: {}",
        metadata.magic_bytes.split(' ').take(16).collect::<Vec<_>>().join(" ")
    )];

    // 1. Header/extension mismatch.
    if textual && binary_ext {
        details.push(format!("Header is readable text but the extension is .{ext}"));
        return verdict(
            ThreatLevel::Dangerous,
            95,
            format!("Text content disguised as a .{ext} file."),
            details,
        );
    }

    if let Some(sig) = signature {
        details.push(format!("Signature: {}", sig.name));
        let matches_ext = sig.extensions.contains(&ext.as_str());

        if sig.executable && !matches_ext {
            details.push(format!("Executable header under a .{ext} extension"));
            return verdict(
                ThreatLevel::Dangerous,
                92,
                format!("{} disguised as a .{ext} file.", sig.name),
                details,
            );
        }
        if sig.executable {
            return verdict(
                ThreatLevel::Suspicious,
                60,
                format!("{}; verify its source before running it.", sig.name),
                details,
            );
        }
        if find_subslice(&body[1..], DOS_STUB) {
            details.push("Embedded Windows executable found after the header".to_string());
            return verdict(
                ThreatLevel::Dangerous,
                90,
                format!("{} carries appended executable content.", sig.name),
                details,
            );
        }
        if !matches_ext && binary_ext {
            details.push(format!("{} header does not match the .{ext} extension", sig.name));
            return verdict(
                ThreatLevel::Dangerous,
                88,
                format!("{} disguised as a .{ext} file.", sig.name),
                details,
            );
        }
        if !matches_ext {
            let named = if ext.is_empty() {
                "without an extension".to_string()
            } else {
                format!("under a .{ext} extension")
            };
            details.push(format!("{} header {named}", sig.name));
            return verdict(
                ThreatLevel::Suspicious,
                50,
                format!("{} saved {named}.", sig.name),
                details,
            );
        }
        return verdict(
            ThreatLevel::Safe,
            5,
            format!("{} with a matching header.", sig.name),
            details,
        );
    }

    // 2. Text and scripts.
    if textual {
        let text = String::from_utf8_lossy(&body[..body.len().min(TEXT_CHAR_LIMIT * 4)]);
        let text = truncate_text(&text).to_lowercase();
        let script_like = SCRIPT_EXTENSIONS.contains(&ext.as_str()) || text.starts_with("#!");

        let mut hits = 0usize;
        let mut destructive = false;
        for (needle, label, is_destructive) in INDICATORS {
            if text.contains(needle) {
                hits += 1;
                destructive |= *is_destructive;
                details.push(format!("Indicator: {label}"));
            }
        }
        let hex_escapes = text.matches("\\x").count();
        if hex_escapes >= HEX_ESCAPE_THRESHOLD {
            hits += 1;
            details.push(format!("Indicator: {hex_escapes} hex-escaped byte sequences"));
        }

        return match (script_like, hits, destructive) {
            (_, 0, _) if script_like => verdict(
                ThreatLevel::Safe,
                10,
                "Script without obfuscation or destructive commands.".to_string(),
                details,
            ),
            (_, 0, _) => verdict(
                ThreatLevel::Safe,
                2,
                "Plain human-readable text.".to_string(),
                details,
            ),
            (true, n, d) if d || n >= 2 => verdict(
                ThreatLevel::Dangerous,
                85,
                "Script with obfuscated or destructive code.".to_string(),
                details,
            ),
            (true, _, _) => verdict(
                ThreatLevel::Suspicious,
                60,
                "Script with an obfuscation indicator.".to_string(),
                details,
            ),
            (false, _, _) => verdict(
                ThreatLevel::Suspicious,
                40,
                "Text mentions code or commands commonly used in attacks.".to_string(),
                details,
            ),
        };
    }

    // 3. Anything else cannot be verified from its header.
    details.push("No known signature".to_string());
    verdict(
        ThreatLevel::Suspicious,
        35,
        format!("Unrecognised binary format ({}).", metadata.mime_type),
        details,
    )
}
