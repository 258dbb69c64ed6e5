//! # relay-gateway
//!
//! WebSocket gateway for the presence-tracked message relay.
//!
//! - [`presence`]: which connection currently represents each user
//! - [`connection`]: connection lifecycle and the outbound event sink
//! - [`relay`]: persist a submitted message and fan it out to reachable parties
//! - [`handlers`]: per-connection dispatch of inbound events
//! - [`server`]: axum router, WebSocket upgrade and process wiring

pub mod connection;
pub mod handlers;
pub mod presence;
pub mod protocol;
pub mod relay;
pub mod server;

pub use server::{create_app, create_gateway_state, run, run_server, serve_until, GatewayState};
