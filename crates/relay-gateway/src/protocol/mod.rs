//! Gateway protocol definitions
//!
//! Every WebSocket text frame is a JSON envelope `{"event": <name>, "data": <payload>}`.

mod messages;
mod payloads;

pub use messages::{ClientEvent, ServerEvent};
pub use payloads::{ErrorNotice, SendMessagePayload};
