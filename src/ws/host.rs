//! Host message handlers
//!
//! Handlers for the host display: attaching to a session's host audience
//! and driving the game start. Question pacing after start is timer-driven.

use super::handlers::Dispatch;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::ConnectionId;
use std::sync::Arc;

pub async fn handle_admin_join(
    state: &Arc<AppState>,
    conn_id: &ConnectionId,
    code: &str,
) -> Dispatch {
    match state.attach_host(conn_id, code).await {
        Ok(rx) => Dispatch {
            reply: None,
            subscription: Some(rx),
        },
        Err(e) => Dispatch::reply(ServerMessage::error(&e)),
    }
}

pub async fn handle_start_game(
    state: &Arc<AppState>,
    conn_id: &ConnectionId,
    code: &str,
) -> Dispatch {
    match state.clone().start_game(conn_id, code).await {
        Ok(()) => Dispatch::silent(),
        Err(e) => Dispatch::reply(ServerMessage::error(&e)),
    }
}
