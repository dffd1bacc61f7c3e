//! # Verdict Parsing
//!
//! Turns model output into a fully-typed [`AnalysisResult`] or the UNKNOWN
//! sentinel. A partially-valid verdict is never returned.

use domains::{AnalysisResult, ThreatLevel};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    threat_level: ThreatLevel,
    // Models often emit `87.0` for integer fields.
    score: f64,
    summary: String,
    technical_details: Vec<String>,
    recommendation: String,
}

/// Removes markdown code-fence artifacts (```json … ```) and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Deserializes fenced or bare JSON.
pub fn decode_fenced<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(text))
}

fn try_parse(text: &str) -> Result<AnalysisResult, String> {
    let raw: RawVerdict = decode_fenced(text).map_err(|e| e.to_string())?;

    if raw.threat_level == ThreatLevel::Unknown {
        return Err("classifier returned the reserved UNKNOWN level".to_string());
    }
    if !raw.score.is_finite() || !(0.0..=100.0).contains(&raw.score) {
        return Err(format!("score {} outside 0-100", raw.score));
    }

    Ok(AnalysisResult {
        threat_level: raw.threat_level,
        score: raw.score.round() as u8,
        summary: raw.summary,
        technical_details: raw.technical_details,
        recommendation: raw.recommendation,
    })
}

/// Parses a classifier response, degrading to [`AnalysisResult::unknown`].
pub fn parse_verdict(text: &str) -> AnalysisResult {
    match try_parse(text) {
        Ok(result) => result,
        Err(reason) => {
            warn!(%reason, "classifier response did not match the verdict schema");
            AnalysisResult::unknown()
        }
    }
}
