pub mod handlers;
pub mod host;
pub mod player;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ulid::Ulid::new().to_string();
    tracing::info!("Connection established: {}", conn_id);

    let (mut sender, mut receiver) = socket.split();

    // Set once the connection attaches to a session, as host or player.
    let mut session_rx: Option<broadcast::Receiver<ServerMessage>> = None;

    loop {
        tokio::select! {
            // Session-scoped broadcasts for whichever audience this
            // connection joined
            broadcast_msg = async {
                match &mut session_rx {
                    Some(rx) => Some(rx.recv().await),
                    None => {
                        // Not attached yet: wait forever
                        std::future::pending().await
                    }
                }
            } => {
                match broadcast_msg {
                    Some(Ok(msg)) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                        tracing::warn!(
                            "Connection {} lagged, skipped {} events",
                            conn_id,
                            skipped
                        );
                    }
                    Some(Err(broadcast::error::RecvError::Closed)) => {
                        // Session was torn down; stop listening.
                        session_rx = None;
                    }
                    None => {}
                }
            }

            // Handle client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let outcome =
                                    handlers::handle_message(client_msg, &conn_id, &state).await;

                                if let Some(rx) = outcome.subscription {
                                    session_rx = Some(rx);
                                }
                                if let Some(response) = outcome.reply {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sender.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed: {}", conn_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Whichever way the socket ends, the connection's player/binding is
    // torn down atomically with its roster entry.
    state.disconnect(&conn_id).await;
    tracing::info!("Connection closed: {}", conn_id);
}
