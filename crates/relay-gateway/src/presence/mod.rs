//! Presence tracking
//!
//! Maps each user to the single connection that currently represents them.

mod registry;

pub use registry::PresenceRegistry;
