//! Event handlers
//!
//! Handles incoming client events for one connection.

mod error;
mod send_message;

pub use error::{HandlerError, HandlerResult};
pub use send_message::SendMessageHandler;

use crate::connection::Connection;
use crate::protocol::ClientEvent;
use crate::server::GatewayState;
use std::sync::Arc;

/// Dispatch incoming client events to the matching handler
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle an incoming client event
    ///
    /// Events arriving on a closed connection are refused.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<()> {
        if connection.is_closed() {
            return Err(HandlerError::ConnectionClosed);
        }

        tracing::trace!(
            connection_id = %connection.id(),
            event = event.name(),
            "Received event"
        );

        match event {
            ClientEvent::SendMessage(payload) => {
                SendMessageHandler::handle(state, connection, payload).await
            }
        }
    }
}
