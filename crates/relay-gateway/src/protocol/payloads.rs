//! Event payload definitions

use chrono::{DateTime, Utc};
use relay_core::{MessageType, NewMessage, UserId};
use serde::{Deserialize, Serialize};

/// Payload of `sendMessage`
///
/// The sender is optional on the wire so that a missing sender can be reported
/// back to the client instead of failing the whole frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<UserId>,

    pub message_type: MessageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// RFC 3339; the store assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SendMessagePayload {
    /// Create a text submission
    pub fn text(sender: Option<UserId>, recipient: Option<UserId>, content: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            message_type: MessageType::Text,
            content: Some(content.into()),
            file_url: None,
            timestamp: None,
        }
    }

    /// Create a file submission
    pub fn file(sender: Option<UserId>, recipient: Option<UserId>, file_url: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            message_type: MessageType::File,
            content: None,
            file_url: Some(file_url.into()),
            timestamp: None,
        }
    }

    /// The declared sender, treating a blank identity as absent
    pub fn declared_sender(&self) -> Option<&UserId> {
        self.sender
            .as_ref()
            .filter(|sender| !sender.as_str().trim().is_empty())
    }

    /// Convert into a store write for the given sender
    ///
    /// Body invariants are left to the store.
    pub fn into_new_message(self, sender: UserId) -> NewMessage {
        NewMessage {
            sender,
            recipient: self.recipient,
            message_type: self.message_type,
            content: self.content,
            file_url: self.file_url,
            timestamp: self.timestamp,
        }
    }
}

/// Payload of `messageError`, sent only to the connection whose submission failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNotice {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl ErrorNotice {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
