//! # Gemini Adapter
//!
//! [`GenerativeModel`] over the `models/{model}:generateContent` REST call.

use async_trait::async_trait;
use domains::{ClassifierError, Content, GenerationRequest, GenerativeModel, Part, Role};
use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl GeminiClient {
    pub fn new(api_key: Option<SecretString>) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, model)
    }
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: WireBlob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireResponseContent>,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    text: Option<String>,
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text },
            Part::InlineData { mime_type, data } => WirePart::Inline {
                inline_data: WireBlob { mime_type, data },
            },
        }
    }
}

impl From<Content> for WireContent {
    fn from(content: Content) -> Self {
        WireContent {
            role: Some(match content.role {
                Role::User => "user",
                Role::Model => "model",
            }),
            parts: content.parts.into_iter().map(WirePart::from).collect(),
        }
    }
}

fn to_wire(request: GenerationRequest) -> WireRequest {
    let generation_config = if request.response_schema.is_some() || request.temperature.is_some() {
        Some(WireGenerationConfig {
            response_mime_type: request.response_schema.as_ref().map(|_| "application/json"),
            response_schema: request.response_schema,
            temperature: request.temperature,
        })
    } else {
        None
    };

    WireRequest {
        system_instruction: request.system_instruction.map(|text| WireContent {
            role: None,
            parts: vec![WirePart::Text { text }],
        }),
        contents: request.contents.into_iter().map(WireContent::from).collect(),
        generation_config,
    }
}

/// Maps a failed call onto the four classifier failure classes.
pub fn classify_failure(status: StatusCode, body: &str) -> ClassifierError {
    let lower = body.to_ascii_lowercase();
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => ClassifierError::PayloadTooLarge,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClassifierError::InvalidCredential(format!("HTTP {}", status.as_u16()))
        }
        StatusCode::BAD_REQUEST if lower.contains("mime type") => ClassifierError::UnsupportedMedia,
        StatusCode::BAD_REQUEST if lower.contains("api key") => {
            ClassifierError::InvalidCredential("API key rejected".to_string())
        }
        _ => ClassifierError::Unavailable(format!("HTTP {}: {}", status.as_u16(), body.trim())),
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ClassifierError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ClassifierError::InvalidCredential("API key is not configured".to_string()))?;

        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let body = to_wire(request);
        debug!(%model, turns = body.contents.len(), "generateContent");

        let response = self
            .client
            .post(self.url(&model))
            .header(API_KEY_HEADER, api_key.expose_secret())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_failure(status, &text);
            warn!(status = status.as_u16(), error = %err, "generateContent failed");
            return Err(err);
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("unreadable response: {e}")))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ClassifierError::Unavailable(
                "Empty response from analysis engine".to_string(),
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_maps_to_wire_json() {
        let request = GenerationRequest::new()
            .with_system("rules")
            .with_user_parts(vec![
                Part::InlineData {
                    mime_type: "image/png".into(),
                    data: "AQID".into(),
                },
                Part::text("look"),
            ])
            .with_schema(json!({"type": "OBJECT"}))
            .with_temperature(0.1);

        let wire = serde_json::to_value(to_wire(request)).unwrap();
        assert_eq!(wire["systemInstruction"], json!({"parts": [{"text": "rules"}]}));
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(
            wire["contents"][0]["parts"][0],
            json!({"inlineData": {"mimeType": "image/png", "data": "AQID"}})
        );
        assert_eq!(wire["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn plain_chat_has_no_generation_config() {
        let wire = serde_json::to_value(to_wire(GenerationRequest::new().with_turn(Role::Model, "hi"))).unwrap();
        assert!(wire.get("generationConfig").is_none());
        assert_eq!(wire["contents"][0]["role"], "model");
    }

    #[test]
    fn failures_are_classified() {
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, "Unsupported MIME type: application/x-msdownload"),
            ClassifierError::UnsupportedMedia
        );
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key."),
            ClassifierError::InvalidCredential(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            ClassifierError::InvalidCredential(_)
        ));
        assert_eq!(
            classify_failure(StatusCode::PAYLOAD_TOO_LARGE, ""),
            ClassifierError::PayloadTooLarge
        );
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            ClassifierError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn missing_key_is_a_credential_error() {
        let err = GeminiClient::new(None)
            .generate(GenerationRequest::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClassifierError::InvalidCredential("API key is not configured".to_string())
        );
    }
}
