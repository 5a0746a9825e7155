//! WebSocket handler for the monitoring endpoint.
//!
//! Each connected browser holds one of these sockets open; reload payloads
//! are pushed through it, and any inbound traffic tears it down.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;

use crate::state::AppState;

/// Route the injected script connects back to.
pub(crate) const MONITORING_PATH: &str = "/_monitoring_websocket";

/// Handle WebSocket upgrade for the monitoring endpoint.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an established monitoring connection.
///
/// Registers the connection, forwards broadcast payloads to the socket, and
/// terminates on the first inbound event. A message, a close frame and an
/// error are all treated identically as a termination signal; the endpoint
/// itself never originates traffic.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let key = state.registry.register(tx);
    tracing::debug!(key, "Monitoring connection opened");

    loop {
        tokio::select! {
            queued = rx.recv() => {
                match queued {
                    Some(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    // Sender dropped: this entry was pruned by a broadcast.
                    None => break,
                }
            }
            _inbound = socket.recv() => break,
        }
    }

    // Idempotent, safe even if a failed broadcast pruned this key already.
    state.registry.deregister(key);
    let _ = socket.send(Message::Close(None)).await;
    tracing::debug!(key, "Monitoring connection closed");
}
