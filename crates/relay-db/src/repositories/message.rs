//! PostgreSQL implementation of MessageStore

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use relay_core::{
    Message, MessageId, MessageIdGenerator, MessageStore, NewMessage, RepoResult, ResolvedMessage,
};

use crate::mappers::MessageInsert;
use crate::models::{MessageModel, ResolvedMessageModel};

use super::error::{map_db_error, map_insert_error};

/// PostgreSQL implementation of MessageStore
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
    ids: Arc<MessageIdGenerator>,
}

impl PgMessageStore {
    pub fn new(pool: PgPool, ids: Arc<MessageIdGenerator>) -> Self {
        Self { pool, ids }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self, message), fields(sender = %message.sender))]
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageId> {
        message.validate_payload()?;

        let id = self.ids.generate();
        let row = MessageInsert::new(id, message, Utc::now());

        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, recipient_id, message_type, content, file_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(row.id)
        .bind(row.sender_id)
        .bind(row.recipient_id)
        .bind(row.message_type)
        .bind(row.content)
        .bind(row.file_url)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, recipient_id, message_type, content, file_url, created_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Message::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_resolved_by_id(&self, id: MessageId) -> RepoResult<Option<ResolvedMessage>> {
        let result = sqlx::query_as::<_, ResolvedMessageModel>(
            r"
            SELECT m.id, m.message_type, m.content, m.file_url, m.created_at,
                   m.sender_id, s.email AS sender_email,
                   s.first_name AS sender_first_name, s.last_name AS sender_last_name,
                   s.image AS sender_image, s.color AS sender_color,
                   m.recipient_id, r.email AS recipient_email,
                   r.first_name AS recipient_first_name, r.last_name AS recipient_last_name,
                   r.image AS recipient_image, r.color AS recipient_color
            FROM messages m
            LEFT JOIN users s ON s.id = m.sender_id
            LEFT JOIN users r ON r.id = m.recipient_id
            WHERE m.id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ResolvedMessage::try_from).transpose()
    }
}
