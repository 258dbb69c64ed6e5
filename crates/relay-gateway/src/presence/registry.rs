//! Presence registry
//!
//! One entry per user, last connect wins. A reverse index from connection to
//! user makes removal on disconnect O(1). Both maps live behind a single mutex
//! so they always change together; the lock is never held across an `.await`.

use std::collections::HashMap;

use parking_lot::Mutex;
use relay_core::UserId;

use crate::connection::ConnectionId;

#[derive(Debug, Default)]
struct Entries {
    by_user: HashMap<UserId, ConnectionId>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// Registry of reachable users
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: Mutex<Entries>,
}

impl PresenceRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `user_id` at `connection`, replacing any previous entry
    ///
    /// Returns the connection that was superseded, if any. The superseded
    /// connection loses its reverse entry, so its later close is a no-op here.
    pub fn register(&self, user_id: UserId, connection: ConnectionId) -> Option<ConnectionId> {
        let mut entries = self.entries.lock();

        // A handle represents at most one user
        if let Some(previous_user) = entries.by_connection.insert(connection, user_id.clone()) {
            if previous_user != user_id
                && entries.by_user.get(&previous_user) == Some(&connection)
            {
                entries.by_user.remove(&previous_user);
            }
        }

        let superseded = entries
            .by_user
            .insert(user_id, connection)
            .filter(|previous| *previous != connection);

        if let Some(previous) = superseded {
            entries.by_connection.remove(&previous);
        }

        superseded
    }

    /// Current connection for `user_id`
    pub fn lookup(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.entries.lock().by_user.get(user_id).copied()
    }

    /// Remove the entry held by `connection`
    ///
    /// Returns the freed user, or `None` when the connection is not the
    /// current one for any user (never registered or already superseded).
    pub fn unregister(&self, connection: ConnectionId) -> Option<UserId> {
        let mut entries = self.entries.lock();

        let user_id = entries.by_connection.remove(&connection)?;
        if entries.by_user.get(&user_id) == Some(&connection) {
            entries.by_user.remove(&user_id);
            Some(user_id)
        } else {
            None
        }
    }

    /// Check if a user currently has a registered connection
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.entries.lock().by_user.contains_key(user_id)
    }

    /// Number of users with a registered connection
    pub fn online_count(&self) -> usize {
        self.entries.lock().by_user.len()
    }
}
