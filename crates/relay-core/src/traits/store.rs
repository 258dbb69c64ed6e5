//! Store traits (ports) - the persistence gateway the relay depends on
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Implementations must be safe for concurrent use.

use async_trait::async_trait;

use crate::entities::{Message, NewMessage, ResolvedMessage, UserProfile};
use crate::error::DomainError;
use crate::value_objects::{MessageId, UserId};

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Message Store
// ============================================================================

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Validate and persist a new message, returning the assigned id
    ///
    /// Body invariant violations are reported as `DomainError::ValidationError`.
    async fn create(&self, message: &NewMessage) -> RepoResult<MessageId>;

    /// Find a stored message without resolving its parties
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>>;

    /// Find a stored message with sender and recipient expanded to profiles
    async fn find_resolved_by_id(&self, id: MessageId) -> RepoResult<Option<ResolvedMessage>>;
}

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find the public profile of a user
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<UserProfile>>;

    /// Insert or replace a profile
    async fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()>;
}
