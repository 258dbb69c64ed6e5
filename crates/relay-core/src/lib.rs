//! # relay-core
//!
//! Domain layer for the message relay: message and profile entities, identifiers,
//! and the store traits the relay persists through.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, MessageType, NewMessage, ResolvedMessage, UserProfile};
pub use error::DomainError;
pub use traits::{MessageStore, RepoResult, UserDirectory};
pub use value_objects::{MessageId, MessageIdGenerator, MessageIdParseError, UserId};
