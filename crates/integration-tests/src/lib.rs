//! Shared fixtures for the workspace integration tests.

use chrono::NaiveDate;
use domains::{Item, ItemCategory, ItemStatus, ItemType, User};

/// A well-formed classifier answer.
pub const SAFE_VERDICT: &str = r#"{"threatLevel":"SAFE","score":4,"summary":"Plain notes","technicalDetails":["ASCII text"],"recommendation":"No action needed"}"#;

pub fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: id.to_string(),
    }
}

/// An OPEN wallet reported by `owner`.
pub fn open_item(id: &str, owner: &str) -> Item {
    Item {
        id: id.to_string(),
        kind: ItemType::Found,
        title: "Brown leather wallet".to_string(),
        description: "Found near the fountain".to_string(),
        category: ItemCategory::Accessories,
        location: "Central Park".to_string(),
        date: NaiveDate::from_ymd_opt(2023, 10, 25).unwrap_or_default(),
        image_url: String::new(),
        status: ItemStatus::Open,
        contact_info: None,
        user_id: Some(owner.to_string()),
        claimed_by: None,
    }
}

/// Gemini-style response body carrying `text` in one candidate part.
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}
