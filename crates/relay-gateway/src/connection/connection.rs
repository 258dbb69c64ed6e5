//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its lifecycle state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use relay_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{ConnectionId, EmitError};
use crate::protocol::ServerEvent;

/// Connection lifecycle state
///
/// `Opening -> Registered | Unregistered -> Closed`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Accepted, handshake identity not yet applied
    Opening,
    /// Declared a user identity and was registered for presence
    Registered,
    /// Declared no identity; open but not reachable by user id
    Unregistered,
    /// Transport closed
    Closed,
}

/// A single WebSocket connection
pub struct Connection {
    /// Transport-assigned handle
    id: ConnectionId,

    /// Identity declared in the handshake
    user_id: Option<UserId>,

    /// Current lifecycle state
    state: RwLock<ConnectionState>,

    /// Outbound queue drained by the socket's send task
    sender: mpsc::Sender<ServerEvent>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection in the `Opening` state
    pub fn new(id: ConnectionId, user_id: Option<UserId>, sender: mpsc::Sender<ServerEvent>) -> Arc<Self> {
        Arc::new(Self {
            id,
            user_id,
            state: RwLock::new(ConnectionState::Opening),
            sender,
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Identity declared in the handshake, if any
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Apply the outcome of the handshake
    ///
    /// Has no effect once the connection is closed.
    pub fn set_state(&self, state: ConnectionState) {
        let mut current = self.state.write();
        if *current != ConnectionState::Closed {
            *current = state;
        }
    }

    /// Move to `Closed`, returning `false` if the connection was already closed
    pub fn mark_closed(&self) -> bool {
        let mut current = self.state.write();
        if *current == ConnectionState::Closed {
            return false;
        }
        *current = ConnectionState::Closed;
        true
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Queue an event for the socket without waiting
    ///
    /// A full queue drops the event rather than stalling the caller.
    pub fn try_send(&self, event: ServerEvent) -> Result<(), EmitError> {
        if self.is_closed() {
            return Err(EmitError::Closed(self.id));
        }

        self.sender.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EmitError::QueueFull(self.id),
            mpsc::error::TrySendError::Closed(_) => EmitError::Closed(self.id),
        })
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("state", &self.state())
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ErrorNotice;

    fn notice() -> ServerEvent {
        ServerEvent::MessageError(ErrorNotice::new("TEST", "test"))
    }

    #[test]
    fn test_connection_creation() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new(ConnectionId::new(), Some(UserId::new("alice")), tx);

        assert_eq!(conn.state(), ConnectionState::Opening);
        assert_eq!(conn.user_id().map(UserId::as_str), Some("alice"));
        assert!(!conn.is_closed());
    }

    #[test]
    fn test_closed_is_terminal() {
        let (tx, _rx) = mpsc::channel(10);
        let conn = Connection::new(ConnectionId::new(), None, tx);

        conn.set_state(ConnectionState::Unregistered);
        assert!(conn.mark_closed());
        assert!(!conn.mark_closed());

        conn.set_state(ConnectionState::Registered);
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_try_send_queues_event() {
        let (tx, mut rx) = mpsc::channel(10);
        let conn = Connection::new(ConnectionId::new(), None, tx);

        conn.try_send(notice()).unwrap();
        assert_eq!(rx.recv().await, Some(notice()));
    }

    #[test]
    fn test_try_send_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let conn = Connection::new(ConnectionId::new(), None, tx);

        conn.try_send(notice()).unwrap();
        assert!(matches!(conn.try_send(notice()), Err(EmitError::QueueFull(_))));
    }

    #[test]
    fn test_try_send_after_close() {
        let (tx, rx) = mpsc::channel(1);
        let conn = Connection::new(ConnectionId::new(), None, tx);

        drop(rx);
        assert!(matches!(conn.try_send(notice()), Err(EmitError::Closed(_))));

        let (tx, _rx) = mpsc::channel(1);
        let conn = Connection::new(ConnectionId::new(), None, tx);
        conn.mark_closed();
        assert!(matches!(conn.try_send(notice()), Err(EmitError::Closed(_))));
    }
}
