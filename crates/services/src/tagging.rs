//! # Item Tagging
//!
//! Suggests title, category, description and color for a photographed item.

use std::sync::Arc;

use base64::Engine;
use domains::{ClassifierError, FileUpload, GenerationRequest, GenerativeModel, Part, TaggingSuggestion};
use thiserror::Error;
use tracing::{info, instrument};

use crate::prompt::{tagging_schema, TAGGING_PROMPT};
use crate::verdict::decode_fenced;

#[derive(Error, Debug)]
pub enum TaggingError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("could not read tagging response: {0}")]
    Malformed(String),
}

pub struct ItemTagger {
    model: Arc<dyn GenerativeModel>,
    model_name: Option<String>,
}

impl ItemTagger {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model, model_name: None }
    }

    /// Uses `model` instead of the adapter default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    #[instrument(skip_all, fields(image = %image.name))]
    pub async fn suggest(&self, image: &FileUpload) -> Result<TaggingSuggestion, TaggingError> {
        let mut request = GenerationRequest::new()
            .with_user_parts(vec![
                Part::InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.body),
                },
                Part::text(TAGGING_PROMPT),
            ])
            .with_schema(tagging_schema().clone());
        if let Some(name) = &self.model_name {
            request = request.with_model(name.clone());
        }

        let text = self.model.generate(request).await?;
        let suggestion: TaggingSuggestion =
            decode_fenced(&text).map_err(|e| TaggingError::Malformed(e.to_string()))?;
        info!(category = suggestion.category.as_str(), "tagging suggestion ready");
        Ok(suggestion)
    }
}
