//! Domain entities - core business objects

mod message;
mod user;

pub use message::{Message, MessageType, NewMessage, ResolvedMessage};
pub use user::UserProfile;
