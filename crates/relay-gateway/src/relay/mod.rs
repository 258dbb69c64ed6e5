//! Message relay
//!
//! Persists a submitted message and fans the resolved copy out to whichever
//! parties are reachable at that moment.

mod error;
mod message_relay;

pub use error::RelayError;
pub use message_relay::{Delivery, MessageRelay};
