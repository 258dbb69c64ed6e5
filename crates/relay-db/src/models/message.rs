//! Message database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: i64,
    pub sender_id: String,
    pub recipient_id: Option<String>,
    pub message_type: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A message row left-joined with the sender and recipient profiles
///
/// Profile columns are NULL when the party has no `users` row.
#[derive(Debug, Clone, FromRow)]
pub struct ResolvedMessageModel {
    pub id: i64,
    pub message_type: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,

    pub sender_id: String,
    pub sender_email: Option<String>,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
    pub sender_image: Option<String>,
    pub sender_color: Option<i32>,

    pub recipient_id: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_first_name: Option<String>,
    pub recipient_last_name: Option<String>,
    pub recipient_image: Option<String>,
    pub recipient_color: Option<i32>,
}
