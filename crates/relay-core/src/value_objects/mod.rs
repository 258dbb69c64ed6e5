//! Value objects - immutable types that represent domain concepts

mod message_id;
mod user_id;

pub use message_id::{MessageId, MessageIdGenerator, MessageIdParseError};
pub use user_id::UserId;
