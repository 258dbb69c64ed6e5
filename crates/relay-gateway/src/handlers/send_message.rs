//! `sendMessage` handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::protocol::SendMessagePayload;
use crate::server::GatewayState;
use std::sync::Arc;

/// Handles `sendMessage` events
pub struct SendMessageHandler;

impl SendMessageHandler {
    /// Submit the message to the relay
    ///
    /// The submitting connection receives its copy through the relay's echo,
    /// so a successful submission needs no direct reply.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: SendMessagePayload,
    ) -> HandlerResult<()> {
        let delivery = state.relay().submit(payload).await?;

        tracing::debug!(
            connection_id = %connection.id(),
            message_id = %delivery.message.id,
            emitted = delivery.emitted(),
            "Message submitted"
        );

        Ok(())
    }
}
