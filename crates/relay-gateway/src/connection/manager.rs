//! Connection manager
//!
//! Owns the table of live connections and drives the presence registry from
//! connection open and close events. Uses `DashMap` for concurrent access.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use relay_core::UserId;
use tokio::sync::mpsc;

use super::{Connection, ConnectionId, ConnectionState, EmitError, EventSink};
use crate::presence::PresenceRegistry;
use crate::protocol::ServerEvent;

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Live connections by handle
    connections: DashMap<ConnectionId, Arc<Connection>>,

    /// User to connection mapping shared with the relay
    presence: Arc<PresenceRegistry>,
}

impl ConnectionManager {
    /// Create a new connection manager over a presence registry
    #[must_use]
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self {
            connections: DashMap::new(),
            presence,
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared(presence: Arc<PresenceRegistry>) -> Arc<Self> {
        Arc::new(Self::new(presence))
    }

    /// The presence registry this manager keeps up to date
    pub fn presence(&self) -> &Arc<PresenceRegistry> {
        &self.presence
    }

    /// Accept a new connection
    ///
    /// With a declared identity the connection is registered for presence,
    /// superseding any earlier connection of the same user. Without one it
    /// stays open but unreachable. Neither case is rejected.
    pub fn open(&self, user_id: Option<UserId>, sender: mpsc::Sender<ServerEvent>) -> Arc<Connection> {
        let id = ConnectionId::new();
        let connection = Connection::new(id, user_id.clone(), sender);

        // Live before registered, so a lookup never yields an unknown handle
        self.connections.insert(id, Arc::clone(&connection));

        match user_id {
            Some(user_id) => {
                let superseded = self.presence.register(user_id.clone(), id);
                connection.set_state(ConnectionState::Registered);

                if let Some(previous) = superseded {
                    tracing::debug!(
                        connection_id = %id,
                        user_id = %user_id,
                        superseded = %previous,
                        "Presence moved to newer connection; previous connection left open"
                    );
                }

                tracing::info!(connection_id = %id, user_id = %user_id, "Connection registered");
            }
            None => {
                connection.set_state(ConnectionState::Unregistered);
                tracing::info!(connection_id = %id, "Connection opened without user identity");
            }
        }

        connection
    }

    /// Close a connection
    ///
    /// Idempotent: returns `false` if the connection was already closed or
    /// unknown. Presence is only released if this connection still holds it.
    pub fn close(&self, id: ConnectionId) -> bool {
        let Some((_, connection)) = self.connections.remove(&id) else {
            return false;
        };

        let transitioned = connection.mark_closed();

        match self.presence.unregister(id) {
            Some(user_id) => {
                tracing::debug!(connection_id = %id, user_id = %user_id, "Presence released");
            }
            None => {
                if let Some(user_id) = connection.user_id() {
                    tracing::debug!(
                        connection_id = %id,
                        user_id = %user_id,
                        "Stale connection closed; presence kept by newer connection"
                    );
                }
            }
        }

        tracing::info!(
            connection_id = %id,
            age_ms = connection.age().as_millis(),
            "Connection closed"
        );

        transitioned
    }

    /// Get a live connection by handle
    pub fn get_connection(&self, id: ConnectionId) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| r.value().clone())
    }

    /// Check if a handle belongs to a live connection
    pub fn has_connection(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Get the total number of live connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of users with a registered connection
    pub fn user_count(&self) -> usize {
        self.presence.online_count()
    }
}

#[async_trait]
impl EventSink for ConnectionManager {
    async fn emit(&self, connection: ConnectionId, event: ServerEvent) -> Result<(), EmitError> {
        // Clone the Arc out so no shard lock is held while sending
        let target = self
            .get_connection(connection)
            .ok_or(EmitError::NotConnected(connection))?;

        target.try_send(event)?;

        tracing::trace!(connection_id = %connection, "Event queued");
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.presence.online_count())
            .finish()
    }
}
