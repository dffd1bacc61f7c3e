//! # Chat Assistant
//!
//! Multi-turn help chat. The whole history goes out on every turn.

use std::sync::Arc;

use chrono::Utc;
use domains::{ChatMessage, ClassifierError, GenerationRequest, GenerativeModel, Role};
use tracing::{debug, instrument};

use crate::prompt::ASSISTANT_INSTRUCTION;

pub struct ChatAssistant {
    model: Arc<dyn GenerativeModel>,
    model_name: Option<String>,
    history: Vec<ChatMessage>,
}

impl ChatAssistant {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            model_name: None,
            history: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Sends `text` and returns the model's reply. Blank input is ignored.
    ///
    /// A failed turn leaves the history as it was before the call.
    #[instrument(skip_all, fields(turns = self.history.len()))]
    pub async fn send(&mut self, text: &str) -> Result<Option<ChatMessage>, ClassifierError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.history.push(ChatMessage {
            role: Role::User,
            text: text.to_string(),
            timestamp: Utc::now(),
        });

        let mut request = GenerationRequest::new().with_system(ASSISTANT_INSTRUCTION);
        if let Some(name) = &self.model_name {
            request = request.with_model(name.clone());
        }
        for message in &self.history {
            request = request.with_turn(message.role, message.text.clone());
        }

        match self.model.generate(request).await {
            Ok(reply) => {
                let message = ChatMessage {
                    role: Role::Model,
                    text: reply,
                    timestamp: Utc::now(),
                };
                self.history.push(message.clone());
                Ok(Some(message))
            }
            Err(e) => {
                debug!(error = %e, "chat turn failed, dropping user message");
                self.history.pop();
                Err(e)
            }
        }
    }
}
