//! WebSocket connection loop
//!
//! Inbound frames are parsed and handed to the session manager; everything
//! the session actors emit for this connection flows through one outbound
//! channel drained by a writer task.

use super::protocol::{InboundFrame, Outbound};
use super::AppState;
use crate::runtime::{SessionEvent, SessionManager};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub(super) async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.sessions))
}

async fn handle_socket(socket: WebSocket, sessions: Arc<SessionManager>) {
    // Used for frames that carry no sessionId
    let connection_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(connection_id = %connection_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<SessionEvent>(64);

    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let message = match Outbound::encode(event) {
                Ok(Outbound::Text(text)) => Message::Text(text),
                Ok(Outbound::Binary(audio)) => Message::Binary(audio),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket receive failed");
                break;
            }
        };

        let Some(frame) = InboundFrame::parse(&text) else {
            tracing::debug!(connection_id = %connection_id, "Dropping unparseable frame");
            continue;
        };
        let (session_id, input) = frame.into_parts();
        let session_id = session_id.unwrap_or_else(|| connection_id.clone());
        sessions.dispatch(&session_id, input, tx.clone()).await;
    }

    writer.abort();
    tracing::info!(connection_id = %connection_id, "WebSocket disconnected");
}
