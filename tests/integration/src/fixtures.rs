//! Test fixtures
//!
//! Reusable profiles and client events.

use relay_core::{UserId, UserProfile};
use relay_gateway::protocol::{ClientEvent, SendMessagePayload};

/// Profiles seeded into every test server
pub fn default_profiles() -> Vec<UserProfile> {
    vec![
        UserProfile::new("alice", "alice@example.com")
            .with_name("Alice", "Liddell")
            .with_color(0),
        UserProfile::new("bob", "bob@example.com")
            .with_name("Bob", "Builder")
            .with_color(1)
            .with_image("uploads/profiles/bob.png"),
        UserProfile::new("carol", "carol@example.com"),
    ]
}

/// A `sendMessage` event carrying text
pub fn send_text(sender: Option<&str>, recipient: Option<&str>, content: &str) -> ClientEvent {
    ClientEvent::SendMessage(SendMessagePayload::text(
        sender.map(UserId::from),
        recipient.map(UserId::from),
        content,
    ))
}

/// A `sendMessage` event referencing an uploaded file
pub fn send_file(sender: Option<&str>, recipient: Option<&str>, file_url: &str) -> ClientEvent {
    ClientEvent::SendMessage(SendMessagePayload::file(
        sender.map(UserId::from),
        recipient.map(UserId::from),
        file_url,
    ))
}
