//! Connection management
//!
//! Tracks live WebSocket connections, keeps the presence registry in step with
//! their lifecycle, and delivers outbound events to them.

mod connection;
mod id;
mod manager;
mod sink;

pub use connection::{Connection, ConnectionState};
pub use id::ConnectionId;
pub use manager::ConnectionManager;
pub use sink::{EmitError, EventSink};
