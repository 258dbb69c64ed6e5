//! Gateway event envelopes
//!
//! Inbound frames decode into [`ClientEvent`], outbound frames are built from
//! [`ServerEvent`]. Event names are part of the client contract.

use relay_core::ResolvedMessage;
use serde::{Deserialize, Serialize};

use super::{ErrorNotice, SendMessagePayload};

/// Events a client may send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Submit a message for persistence and delivery
    #[serde(rename = "sendMessage")]
    SendMessage(SendMessagePayload),
}

impl ClientEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "sendMessage",
        }
    }

    /// Parse from a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events the gateway sends to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// A persisted message with both parties resolved to profiles
    #[serde(rename = "receiveMessage")]
    ReceiveMessage(ResolvedMessage),

    /// A submission from this connection failed
    #[serde(rename = "messageError")]
    MessageError(ErrorNotice),
}

impl ServerEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => "receiveMessage",
            Self::MessageError(_) => "messageError",
        }
    }

    /// Parse from a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReceiveMessage(message) => write!(f, "{}(id={})", self.name(), message.id),
            Self::MessageError(notice) => write!(f, "{}(code={})", self.name(), notice.code),
        }
    }
}
