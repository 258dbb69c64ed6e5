//! Relay Integration Tests
//!
//! Each test spawns its own gateway over the in-memory store on a loopback
//! port; no external services are required.
//!
//! Run with: cargo test -p integration-tests --test relay_tests

use integration_tests::{send_file, send_text, TestServer};
use relay_core::{ResolvedMessage, UserId};
use relay_gateway::protocol::{ErrorNotice, ServerEvent};
use reqwest::StatusCode;

fn expect_message(event: ServerEvent) -> ResolvedMessage {
    match event {
        ServerEvent::ReceiveMessage(message) => message,
        other => panic!("expected receiveMessage, got {other}"),
    }
}

fn expect_notice(event: ServerEvent) -> ErrorNotice {
    match event {
        ServerEvent::MessageError(notice) => notice,
        other => panic!("expected messageError, got {other}"),
    }
}

// ============================================================================
// Health Check
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

// ============================================================================
// Delivery
// ============================================================================

#[tokio::test]
async fn test_alice_and_bob_both_receive() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();
    let mut bob = server.connect(Some("bob")).await.unwrap();

    alice
        .send_event(&send_text(Some("alice"), Some("bob"), "hi"))
        .await
        .unwrap();

    let to_bob = expect_message(bob.recv_event().await.unwrap());
    let echo = expect_message(alice.recv_event().await.unwrap());

    assert_eq!(to_bob.id, echo.id);
    assert_eq!(to_bob.content.as_deref(), Some("hi"));
    assert_eq!(to_bob.sender.first_name.as_deref(), Some("Alice"));
    assert_eq!(to_bob.sender.email, "alice@example.com");

    let recipient = to_bob.recipient.as_ref().unwrap();
    assert_eq!(recipient.id, UserId::new("bob"));
    assert_eq!(recipient.color, Some(1));
    assert_eq!(recipient.image.as_deref(), Some("uploads/profiles/bob.png"));

    assert_eq!(server.store.message_count(), 1);
    alice.expect_no_event().await.unwrap();
    bob.expect_no_event().await.unwrap();
}

#[tokio::test]
async fn test_offline_recipient_only_echoes() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();
    let bob = server.connect(Some("bob")).await.unwrap();

    server.disconnect(bob).await.unwrap();
    assert!(!server.state.presence().is_online(&UserId::new("bob")));

    alice
        .send_event(&send_text(Some("alice"), Some("bob"), "are you there?"))
        .await
        .unwrap();

    let echo = expect_message(alice.recv_event().await.unwrap());
    assert_eq!(echo.content.as_deref(), Some("are you there?"));
    assert_eq!(server.store.message_count(), 1);
}

#[tokio::test]
async fn test_file_message_delivered() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();
    let mut bob = server.connect(Some("bob")).await.unwrap();

    bob.send_event(&send_file(Some("bob"), Some("alice"), "uploads/files/1700000000000/plan.pdf"))
        .await
        .unwrap();

    let received = expect_message(alice.recv_event().await.unwrap());
    assert!(received.content.is_none());
    assert_eq!(received.file_url.as_deref(), Some("uploads/files/1700000000000/plan.pdf"));
    expect_message(bob.recv_event().await.unwrap());
}

#[tokio::test]
async fn test_anonymous_connection_can_submit_but_is_unreachable() {
    let server = TestServer::start().await.unwrap();
    let mut anonymous = server.connect(None).await.unwrap();
    let mut bob = server.connect(Some("bob")).await.unwrap();

    assert_eq!(server.state.presence().online_count(), 1);

    anonymous
        .send_event(&send_text(Some("carol"), Some("bob"), "from the side door"))
        .await
        .unwrap();

    let received = expect_message(bob.recv_event().await.unwrap());
    assert_eq!(received.sender.id, UserId::new("carol"));

    // carol has no registered connection, so there is no echo
    anonymous.expect_no_event().await.unwrap();
}

#[tokio::test]
async fn test_unknown_recipient_is_stored_and_echoed() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();

    alice
        .send_event(&send_text(Some("alice"), Some("mallory"), "hello?"))
        .await
        .unwrap();

    let echo = expect_message(alice.recv_event().await.unwrap());
    let recipient = echo.recipient.unwrap();
    assert_eq!(recipient.id, UserId::new("mallory"));
    assert!(recipient.is_unresolved());
    assert_eq!(echo.sender.first_name.as_deref(), Some("Alice"));
    assert_eq!(server.store.message_count(), 1);
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_stale_close_keeps_newer_connection() {
    let server = TestServer::start().await.unwrap();
    let mut old_alice = server.connect(Some("alice")).await.unwrap();
    let mut new_alice = server.connect(Some("alice")).await.unwrap();
    let mut bob = server.connect(Some("bob")).await.unwrap();

    // The superseded connection stays open but no longer receives
    bob.send_event(&send_text(Some("bob"), Some("alice"), "first"))
        .await
        .unwrap();
    expect_message(new_alice.recv_event().await.unwrap());
    expect_message(bob.recv_event().await.unwrap());
    old_alice.expect_no_event().await.unwrap();

    server.disconnect(old_alice).await.unwrap();
    assert!(server.state.presence().is_online(&UserId::new("alice")));

    bob.send_event(&send_text(Some("bob"), Some("alice"), "second"))
        .await
        .unwrap();
    let received = expect_message(new_alice.recv_event().await.unwrap());
    assert_eq!(received.content.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_disconnect_releases_presence() {
    let server = TestServer::start().await.unwrap();
    let alice = server.connect(Some("alice")).await.unwrap();
    assert!(server.state.presence().is_online(&UserId::new("alice")));

    server.disconnect(alice).await.unwrap();
    assert_eq!(server.state.presence().online_count(), 0);
    assert_eq!(server.state.connection_manager().connection_count(), 0);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_missing_sender_reports_notice() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();
    let mut bob = server.connect(Some("bob")).await.unwrap();

    alice
        .send_event(&send_text(None, Some("bob"), "who am I?"))
        .await
        .unwrap();

    let notice = expect_notice(alice.recv_event().await.unwrap());
    assert_eq!(notice.code, "MISSING_SENDER");
    assert_eq!(server.store.message_count(), 0);
    bob.expect_no_event().await.unwrap();
}

#[tokio::test]
async fn test_invalid_body_reports_notice() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();

    alice
        .send_raw(r#"{"event":"sendMessage","data":{"sender":"alice","messageType":"file"}}"#)
        .await
        .unwrap();

    let notice = expect_notice(alice.recv_event().await.unwrap());
    assert_eq!(notice.code, "VALIDATION_ERROR");
    assert_eq!(server.store.message_count(), 0);
}

#[tokio::test]
async fn test_malformed_frames_keep_connection_open() {
    let server = TestServer::start().await.unwrap();
    let mut alice = server.connect(Some("alice")).await.unwrap();

    alice.send_raw("not json").await.unwrap();
    assert_eq!(expect_notice(alice.recv_event().await.unwrap()).code, "DECODE_ERROR");

    alice.send_raw(r#"{"event":"typing","data":{}}"#).await.unwrap();
    assert_eq!(expect_notice(alice.recv_event().await.unwrap()).code, "DECODE_ERROR");

    alice.send_binary(vec![1, 2, 3]).await.unwrap();
    assert_eq!(expect_notice(alice.recv_event().await.unwrap()).code, "DECODE_ERROR");

    alice
        .send_event(&send_text(Some("alice"), None, "still here"))
        .await
        .unwrap();
    let echo = expect_message(alice.recv_event().await.unwrap());
    assert_eq!(echo.content.as_deref(), Some("still here"));
    assert!(echo.recipient.is_none());
}
