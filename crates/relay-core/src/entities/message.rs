//! Message entity - a persisted point-to-point (or undirected) message

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::UserProfile;
use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Kind of message body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Body is inline `content`
    Text,
    /// Body is a previously uploaded file referenced by `file_url`
    File,
}

impl MessageType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message about to be written to the store
///
/// Exactly one of `content` / `file_url` must be set, chosen by `message_type`.
/// Stores call [`NewMessage::validate_payload`] before writing.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[validate(schema(function = "validate_body"))]
pub struct NewMessage {
    pub sender: UserId,
    pub recipient: Option<UserId>,
    pub message_type: MessageType,
    pub content: Option<String>,
    pub file_url: Option<String>,
    /// Defaults to the time of persistence when absent
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMessage {
    /// Create a text message
    pub fn text(sender: UserId, recipient: Option<UserId>, content: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            message_type: MessageType::Text,
            content: Some(content.into()),
            file_url: None,
            timestamp: None,
        }
    }

    /// Create a file message
    pub fn file(sender: UserId, recipient: Option<UserId>, file_url: impl Into<String>) -> Self {
        Self {
            sender,
            recipient,
            message_type: MessageType::File,
            content: None,
            file_url: Some(file_url.into()),
            timestamp: None,
        }
    }

    /// Check the body invariants, mapping failures to a domain validation error
    pub fn validate_payload(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))
    }

    /// Materialize the stored record once the store has assigned an id
    pub fn into_message(self, id: MessageId, now: DateTime<Utc>) -> Message {
        Message {
            id,
            sender: self.sender,
            recipient: self.recipient,
            message_type: self.message_type,
            content: self.content,
            file_url: self.file_url,
            timestamp: self.timestamp.unwrap_or(now),
        }
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn body_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_body(message: &NewMessage) -> Result<(), ValidationError> {
    if message.sender.as_str().trim().is_empty() {
        return Err(body_error("sender_required", "sender is required"));
    }

    match message.message_type {
        MessageType::Text => {
            if is_blank(message.content.as_ref()) {
                return Err(body_error("content_required", "content is required for text messages"));
            }
            if message.file_url.is_some() {
                return Err(body_error("file_url_not_allowed", "text messages cannot carry a fileUrl"));
            }
        }
        MessageType::File => {
            if is_blank(message.file_url.as_ref()) {
                return Err(body_error("file_url_required", "fileUrl is required for file messages"));
            }
            if message.content.is_some() {
                return Err(body_error("content_not_allowed", "file messages cannot carry content"));
            }
        }
    }

    Ok(())
}

/// A stored message with unresolved party identities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub sender: UserId,
    pub recipient: Option<UserId>,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A stored message with both parties expanded to their profiles
///
/// This is the shape delivered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMessage {
    pub id: MessageId,
    pub sender: UserProfile,
    pub recipient: Option<UserProfile>,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResolvedMessage {
    /// Combine a stored message with the resolved party profiles
    pub fn new(message: Message, sender: UserProfile, recipient: Option<UserProfile>) -> Self {
        Self {
            id: message.id,
            sender,
            recipient,
            message_type: message.message_type,
            content: message.content,
            file_url: message.file_url,
            timestamp: message.timestamp,
        }
    }
}
