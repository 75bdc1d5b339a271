// ABOUTME: Chat transcript types consumed by the intent classifier
// ABOUTME: Supports plain-text and segmented message content

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// One part of a segmented message. Only segments of kind `"text"` carry
/// classifiable content; other kinds (images, attachments) are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSegment {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Message body, either a plain string or a list of typed segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Segments(Vec<MessageSegment>),
}

impl MessageContent {
    /// Extract classifiable text. Text segments are joined with newlines.
    pub fn plain_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Segments(segments) => segments
                .iter()
                .filter(|s| s.kind == "text")
                .filter_map(|s| s.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A single chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Text of the most recent user-authored message.
///
/// Returns `None` when the history has no user turn or the latest one is
/// empty/whitespace-only; callers fall back to their mode default.
pub fn latest_user_text(history: &[ChatMessage]) -> Option<String> {
    history
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.plain_text())
        .filter(|text| !text.trim().is_empty())
}
