//! In-memory message store
//!
//! Process-local implementation of the store traits for development and tests.
//! Parties need not exist in the directory: a message is stored as submitted and
//! a party without a profile resolves to an id-only profile.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::instrument;

use relay_core::{
    Message, MessageId, MessageIdGenerator, MessageStore, NewMessage, RepoResult,
    ResolvedMessage, UserDirectory, UserId, UserProfile,
};

/// DashMap-backed store of profiles and messages
#[derive(Default)]
pub struct MemoryMessageStore {
    users: DashMap<UserId, UserProfile>,
    messages: DashMap<MessageId, Message>,
    ids: Arc<MessageIdGenerator>,
}

impl MemoryMessageStore {
    #[must_use]
    pub fn new(ids: Arc<MessageIdGenerator>) -> Self {
        Self {
            users: DashMap::new(),
            messages: DashMap::new(),
            ids,
        }
    }

    /// Create a store pre-populated with profiles
    #[must_use]
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::default();
        for profile in profiles {
            store.users.insert(profile.id.clone(), profile);
        }
        store
    }

    /// Number of stored messages
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn resolve(&self, id: &UserId) -> UserProfile {
        self.users
            .get(id)
            .map_or_else(|| UserProfile::unresolved(id.clone()), |p| p.clone())
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    #[instrument(skip(self, message), fields(sender = %message.sender))]
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageId> {
        message.validate_payload()?;

        let id = self.ids.generate();
        self.messages
            .insert(id, message.clone().into_message(id, Utc::now()));

        Ok(id)
    }

    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn find_resolved_by_id(&self, id: MessageId) -> RepoResult<Option<ResolvedMessage>> {
        // Clone out before resolving so no shard lock is held across lookups
        let Some(message) = self.messages.get(&id).map(|m| m.clone()) else {
            return Ok(None);
        };

        let sender = self.resolve(&message.sender);
        let recipient = message.recipient.as_ref().map(|r| self.resolve(r));

        Ok(Some(ResolvedMessage::new(message, sender, recipient)))
    }
}

#[async_trait]
impl UserDirectory for MemoryMessageStore {
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<UserProfile>> {
        Ok(self.users.get(id).map(|p| p.clone()))
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()> {
        self.users.insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}

impl std::fmt::Debug for MemoryMessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMessageStore")
            .field("users", &self.users.len())
            .field("messages", &self.messages.len())
            .finish()
    }
}
