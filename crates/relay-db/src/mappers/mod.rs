//! Entity to model mappers
//!
//! Conversions between domain entities (relay-core) and database models.
//! - `From`/`TryFrom<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database writes

mod message;
mod user;

pub use message::{parse_message_type, MessageInsert};
