//! # Analysis Models
//!
//! Entities produced and consumed by the file-triage pipeline.
//! Everything here is plain data; reading files and talking to the
//! classifier happens in `services` and the adapter crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::items::ItemCategory;

/// Number of leading bytes captured in [`FileMetadata::magic_bytes`].
pub const HEADER_BYTES: usize = 4096;

/// MIME type assumed when the file source declares none.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Facts about an uploaded file, computed once per upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    /// Declared MIME type, never empty (falls back to [`DEFAULT_MIME`]).
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Lowercase text after the final dot, empty for `README` or `.gitignore`.
    pub extension: String,
    /// Uppercase space-separated hex pairs, e.g. `"89 50 4E 47"`.
    pub magic_bytes: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Verdict class returned by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Safe,
    Suspicious,
    Dangerous,
    /// Reserved for unparsable classifier output; never requested from a model.
    Unknown,
}

impl ThreatLevel {
    /// The levels a classifier is allowed to emit.
    pub const CLASSIFIER_LEVELS: [ThreatLevel; 3] =
        [ThreatLevel::Safe, ThreatLevel::Suspicious, ThreatLevel::Dangerous];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Safe => "SAFE",
            ThreatLevel::Suspicious => "SUSPICIOUS",
            ThreatLevel::Dangerous => "DANGEROUS",
            ThreatLevel::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured verdict for one analysis request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub threat_level: ThreatLevel,
    /// 0–100, 100 being most dangerous.
    pub score: u8,
    pub summary: String,
    pub technical_details: Vec<String>,
    pub recommendation: String,
}

impl AnalysisResult {
    /// Fallback verdict used when classifier output cannot be parsed.
    pub fn unknown() -> Self {
        Self {
            threat_level: ThreatLevel::Unknown,
            score: 0,
            summary: "Analysis completed but response format was invalid.".to_string(),
            technical_details: vec!["Raw response parsing failed".to_string()],
            recommendation: "Please try re-uploading the file.".to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.threat_level == ThreatLevel::Unknown
    }

    /// Returns a copy whose summary starts with `prefix`.
    pub fn with_summary_prefix(self, prefix: &str) -> Self {
        Self {
            summary: format!("{prefix}{}", self.summary),
            ..self
        }
    }
}

/// How a file body is submitted to the cloud classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStrategy {
    /// Decoded text, truncated to a fixed character ceiling.
    Text,
    /// Full binary body, base64-encoded inline.
    Media,
    /// No body; only [`FileMetadata`] is referenced in the prompt.
    MetadataOnly,
}

// ── Generative model request shapes ─────────────────────────────────────────

/// Author of a turn in a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a turn: text or an inline binary blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    InlineData {
        mime_type: String,
        /// Base64-encoded body.
        data: String,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

/// A single content-generation call, independent of the vendor wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Overrides the adapter's default model when set.
    pub model: Option<String>,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    /// JSON schema the response must match; implies a JSON response type.
    pub response_schema: Option<serde_json::Value>,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Appends a user turn made of `parts`.
    pub fn with_user_parts(mut self, parts: Vec<Part>) -> Self {
        self.contents.push(Content { role: Role::User, parts });
        self
    }

    pub fn with_turn(mut self, role: Role, text: impl Into<String>) -> Self {
        self.contents.push(Content {
            role,
            parts: vec![Part::text(text)],
        });
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }
}

/// Fields suggested by the model for a photographed lost/found item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggingSuggestion {
    pub title: String,
    pub category: ItemCategory,
    pub description: String,
    pub color: String,
}

/// One line of the assistant conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}
