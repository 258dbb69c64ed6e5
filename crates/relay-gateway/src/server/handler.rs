//! WebSocket handler
//!
//! Handles WebSocket connections and message processing.

use crate::connection::Connection;
use crate::handlers::{HandlerError, MessageDispatcher};
use crate::protocol::{ClientEvent, ServerEvent};
use crate::server::GatewayState;
use axum::{
    extract::{ws::Message, Query, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use relay_core::UserId;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Handshake parameters
#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    /// Declared user identity; absent or blank leaves the connection unregistered
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<SocketParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let user_id = UserId::from_handshake(params.user_id.as_deref());
    ws.on_upgrade(move |socket| handle_socket(state, socket, user_id))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: axum::extract::ws::WebSocket, user_id: Option<UserId>) {
    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config().relay.outbound_buffer);

    let connection = state.connection_manager().open(user_id, tx);
    let connection_id = connection.id();

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    let state_recv = state.clone();
    let connection_recv = Arc::clone(&connection);

    // Receive task: frames from this connection are handled strictly in order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_message(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Binary frames not supported");
                    report_error(
                        &connection_recv,
                        &HandlerError::InvalidPayload("binary frames are not supported".to_string()),
                    );
                }
                Ok(Message::Ping(_)) => {
                    tracing::trace!(connection_id = %connection_id, "Ping received");
                    // Pong is handled automatically by axum
                }
                Ok(Message::Pong(_)) => {
                    tracing::trace!(connection_id = %connection_id, "Pong received");
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client closed connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    // Send task: drain the outbound queue into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(connection_id = %connection_id, error = %e, "Failed to encode event");
                    continue;
                }
            };

            if ws_sink.send(Message::Text(json)).await.is_err() {
                tracing::debug!(connection_id = %connection_id, "Failed to send event to WebSocket");
                break;
            }
        }

        let _ = ws_sink.close().await;
    });

    // Whichever side finishes first ends the connection
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    state.connection_manager().close(connection_id);
}

/// Decode and dispatch a text frame
async fn handle_text_message(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    let result = match ClientEvent::from_json(text) {
        Ok(event) => MessageDispatcher::dispatch(state, connection, event).await,
        Err(e) => Err(HandlerError::InvalidPayload(e.to_string())),
    };

    if let Err(e) = result {
        report_error(connection, &e);
    }
}

/// Log a failed event and notify the submitting connection
fn report_error(connection: &Connection, error: &HandlerError) {
    match error {
        HandlerError::Relay(e) if !e.is_client_error() => {
            tracing::error!(connection_id = %connection.id(), error = %e, "Submission failed");
        }
        _ => {
            tracing::warn!(
                connection_id = %connection.id(),
                code = error.code(),
                error = %error,
                "Rejected client event"
            );
        }
    }

    if let Some(notice) = error.to_notice() {
        if let Err(e) = connection.try_send(ServerEvent::MessageError(notice)) {
            tracing::debug!(connection_id = %connection.id(), error = %e, "Failed to queue error notice");
        }
    }
}
