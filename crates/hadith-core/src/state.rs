//! UI-agnostic conversation types
//!
//! These are shared by the TUI and the CLI subcommands and are the exact
//! shape persisted to storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::strings;

/// Opaque message identifier. UUID v7, so ids sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Lifecycle of an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Loading,
    Success,
    Error,
}

/// A source citation returned alongside a generated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub uri: String,
    pub title: String,
}

/// A chat message in the verification conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_urls: Option<Vec<GroundingLink>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            status: None,
            grounding_urls: None,
        }
    }

    /// Empty assistant reply awaiting a verification result
    pub fn placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            status: Some(MessageStatus::Loading),
            grounding_urls: None,
        }
    }

    pub fn greeting() -> Self {
        Self {
            id: MessageId::new(),
            role: ChatRole::Assistant,
            content: strings::GREETING.to_string(),
            timestamp: Utc::now(),
            status: None,
            grounding_urls: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == Some(MessageStatus::Loading)
    }

    pub fn links(&self) -> &[GroundingLink] {
        self.grounding_urls.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_sort_in_creation_order() {
        let first = ChatMessage::user("a");
        let second = ChatMessage::placeholder();
        assert!(first.id < second.id);
    }

    #[test]
    fn test_serialized_shape() {
        let mut msg = ChatMessage::placeholder();
        msg.status = Some(MessageStatus::Success);
        msg.grounding_urls = Some(vec![GroundingLink {
            uri: "https://dorar.net".to_string(),
            title: "الدرر السنية".to_string(),
        }]);

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["status"], "success");
        assert_eq!(value["groundingUrls"][0]["uri"], "https://dorar.net");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_timestamp_rehydrates() {
        let msg = ChatMessage::user("نص");
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, msg.timestamp);
        assert_eq!(back.status, None);
        assert!(back.links().is_empty());
    }
}
