//! Database models - SQLx-compatible structs for PostgreSQL rows

mod message;
mod user;

pub use message::{MessageModel, ResolvedMessageModel};
pub use user::UserModel;
