//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::ConnectionManager;
use crate::presence::PresenceRegistry;
use crate::relay::MessageRelay;
use relay_common::AppConfig;
use relay_core::MessageStore;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server. The presence registry
/// is owned here and shared by the connection manager and the relay.
#[derive(Clone)]
pub struct GatewayState {
    /// Message relay
    relay: Arc<MessageRelay>,
    /// Connection manager for WebSocket connections
    connection_manager: Arc<ConnectionManager>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Wire the relay, presence registry and connection manager over a store
    pub fn new(store: Arc<dyn MessageStore>, config: AppConfig) -> Self {
        let presence = Arc::new(PresenceRegistry::new());
        let connection_manager = ConnectionManager::new_shared(Arc::clone(&presence));
        let relay = MessageRelay::new(store, presence, connection_manager.clone());

        Self {
            relay: Arc::new(relay),
            connection_manager,
            config: Arc::new(config),
        }
    }

    /// Get the message relay
    pub fn relay(&self) -> &MessageRelay {
        &self.relay
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the presence registry
    pub fn presence(&self) -> &PresenceRegistry {
        self.connection_manager.presence()
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
impl GatewayState {
    /// State over an empty in-memory store
    pub(crate) fn for_tests() -> Self {
        Self::for_tests_with_profiles([])
    }

    /// State over an in-memory store seeded with profiles
    pub(crate) fn for_tests_with_profiles(
        profiles: impl IntoIterator<Item = relay_core::UserProfile>,
    ) -> Self {
        let config = AppConfig::from_lookup(|key| (key == "GATEWAY_PORT").then(|| "0".to_string()))
            .expect("test config");
        let store = Arc::new(relay_db::MemoryMessageStore::with_profiles(profiles));
        Self::new(store, config)
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("config", &"AppConfig")
            .finish()
    }
}
