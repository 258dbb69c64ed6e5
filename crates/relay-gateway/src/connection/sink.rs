//! Outbound event delivery seam
//!
//! The relay emits through [`EventSink`] so it never touches sockets directly.

use async_trait::async_trait;
use thiserror::Error;

use super::ConnectionId;
use crate::protocol::ServerEvent;

/// Failure to hand an event to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// No live connection with this handle
    #[error("Connection {0} is not connected")]
    NotConnected(ConnectionId),

    /// The connection's outbound queue is full
    #[error("Outbound queue full for connection {0}")]
    QueueFull(ConnectionId),

    /// The connection is closing or closed
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),
}

/// Delivers server events to connections by handle
///
/// Delivery is fire-and-forget: an error is reported once and never retried.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, connection: ConnectionId, event: ServerEvent) -> Result<(), EmitError>;
}
