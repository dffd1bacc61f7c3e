//! # Rule Prompt
//!
//! The fixed system instruction and response schemas sent with each
//! generation request.

use domains::{FileMetadata, ItemCategory, ThreatLevel};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

static VERDICT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let levels: Vec<&str> = ThreatLevel::CLASSIFIER_LEVELS.iter().map(|l| l.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "threatLevel": { "type": "STRING", "enum": levels },
            "score": {
                "type": "INTEGER",
                "description": "0-100 score where 100 is most dangerous"
            },
            "summary": { "type": "STRING" },
            "technicalDetails": { "type": "ARRAY", "items": { "type": "STRING" } },
            "recommendation": { "type": "STRING" }
        },
        "required": ["threatLevel", "score", "summary", "technicalDetails", "recommendation"]
    })
});

static TAGGING_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let categories: Vec<&str> = ItemCategory::ALL.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A short, clear title for the item (e.g. 'Blue Nike Backpack')"
            },
            "category": {
                "type": "STRING",
                "enum": categories,
                "description": "The most appropriate category"
            },
            "description": {
                "type": "STRING",
                "description": "A concise visual description of the item."
            },
            "color": { "type": "STRING", "description": "The primary color of the item." }
        },
        "required": ["title", "category", "description", "color"]
    })
});

/// AnalysisResult shape with `threatLevel` restricted to SAFE/SUSPICIOUS/DANGEROUS.
pub fn verdict_schema() -> &'static Value {
    &VERDICT_SCHEMA
}

pub fn tagging_schema() -> &'static Value {
    &TAGGING_SCHEMA
}

/// System instruction for the threat classifier, with the file's facts embedded.
pub fn rule_prompt(metadata: &FileMetadata) -> String {
    format!(
        r#"You are a file security analysis engine performing digital forensics triage.
Analyze the provided file content and metadata and decide whether the file is a threat.

DECISION RULES

1. Header/extension mismatch is an automatic DANGEROUS verdict.
   - Hex header: "{magic}"
   - Extension: ".{ext}"
   If the header shows readable text (or any content type) that contradicts the
   extension, for example a text header under an image or executable extension
   such as .jpg or .exe, mark the file DANGEROUS. This is a spoofing technique.

2. Scripts and code.
   - Look for obfuscation: dynamic evaluation (eval, atob, Function constructors),
     encoded or hex-escaped payloads, base64 blobs fed to interpreters.
   - Look for destructive commands: rm -rf, format, system32 tampering,
     powershell -encodedcommand.
   - A script-like file (.js, .py, .bat, .ps1, .sh) with these indicators is
     SUSPICIOUS or DANGEROUS.

3. Safe files.
   - Plain human-readable text without code syntax is SAFE.
   - Standard media whose header matches its extension, with no appended
     executable content, is SAFE.

METADATA
- Name: {name}
- Type: {mime}
- Size: {size} bytes

Respond strictly with JSON matching the response schema."#,
        magic = metadata.magic_bytes,
        ext = metadata.extension,
        name = metadata.name,
        mime = metadata.mime_type,
        size = metadata.size,
    )
}

pub const TAGGING_PROMPT: &str = "Analyze this image of a lost/found item. Identify what it is, \
suggest a title, categorize it, describe it briefly (visual features like wear, brand, stickers), \
and identify the main color.";

pub const ASSISTANT_INSTRUCTION: &str = r#"You are the helpful assistant for "LOSTit", a lost and found application for universities and public spaces.

Help users to:
1. Report a lost or found item.
2. Understand how photo auto-tagging fills in item details.
3. Understand the safety features: contact details stay masked until a claim is verified.
4. Recover lost items in general.

Tone: friendly, empathetic and concise.

You cannot browse the live item catalog from this chat. If a user asks about a specific item, point them to the gallery and its search and filter tools."#;
