//! Message entity <-> model mapper

use chrono::{DateTime, Utc};
use relay_core::{
    DomainError, Message, MessageId, MessageType, NewMessage, ResolvedMessage, UserId, UserProfile,
};

use crate::models::{MessageModel, ResolvedMessageModel};

/// Parse the `message_type` column
pub fn parse_message_type(raw: &str) -> Result<MessageType, DomainError> {
    MessageType::parse(raw)
        .ok_or_else(|| DomainError::InternalError(format!("unknown message_type in row: {raw}")))
}

impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        Ok(Message {
            id: MessageId::new(model.id),
            sender: UserId::from(model.sender_id),
            recipient: model.recipient_id.map(UserId::from),
            message_type: parse_message_type(&model.message_type)?,
            content: model.content,
            file_url: model.file_url,
            timestamp: model.created_at,
        })
    }
}

/// Columns of one left-joined `users` row
struct JoinedProfile {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image: Option<String>,
    color: Option<i32>,
}

impl From<JoinedProfile> for UserProfile {
    fn from(joined: JoinedProfile) -> Self {
        let Some(email) = joined.email else {
            return UserProfile::unresolved(joined.id);
        };

        UserProfile {
            id: UserId::from(joined.id),
            email,
            first_name: joined.first_name,
            last_name: joined.last_name,
            image: joined.image,
            color: joined.color,
        }
    }
}

impl TryFrom<ResolvedMessageModel> for ResolvedMessage {
    type Error = DomainError;

    fn try_from(model: ResolvedMessageModel) -> Result<Self, Self::Error> {
        let message_type = parse_message_type(&model.message_type)?;

        let sender = UserProfile::from(JoinedProfile {
            id: model.sender_id,
            email: model.sender_email,
            first_name: model.sender_first_name,
            last_name: model.sender_last_name,
            image: model.sender_image,
            color: model.sender_color,
        });

        let recipient = model.recipient_id.map(|id| {
            UserProfile::from(JoinedProfile {
                id,
                email: model.recipient_email,
                first_name: model.recipient_first_name,
                last_name: model.recipient_last_name,
                image: model.recipient_image,
                color: model.recipient_color,
            })
        });

        Ok(ResolvedMessage {
            id: MessageId::new(model.id),
            sender,
            recipient,
            message_type,
            content: model.content,
            file_url: model.file_url,
            timestamp: model.created_at,
        })
    }
}

/// Values bound when inserting a new message
pub struct MessageInsert<'a> {
    pub id: i64,
    pub sender_id: &'a str,
    pub recipient_id: Option<&'a str>,
    pub message_type: &'static str,
    pub content: Option<&'a str>,
    pub file_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl<'a> MessageInsert<'a> {
    /// Prepare a validated message for insertion, defaulting its timestamp to `now`
    pub fn new(id: MessageId, message: &'a NewMessage, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into_inner(),
            sender_id: message.sender.as_str(),
            recipient_id: message.recipient.as_ref().map(UserId::as_str),
            message_type: message.message_type.as_str(),
            content: message.content.as_deref(),
            file_url: message.file_url.as_deref(),
            created_at: message.timestamp.unwrap_or(now),
        }
    }
}
