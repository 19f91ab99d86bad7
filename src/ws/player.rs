//! Player message handlers
//!
//! Handlers for player devices: joining a waiting session and submitting
//! timed answers.

use super::handlers::Dispatch;
use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::ConnectionId;
use std::sync::Arc;

pub async fn handle_join_game(
    state: &Arc<AppState>,
    conn_id: &ConnectionId,
    code: &str,
    nickname: String,
    avatar: String,
) -> Dispatch {
    match state.join_session(conn_id, code, nickname, avatar).await {
        Ok((code, players, rx)) => Dispatch {
            reply: Some(ServerMessage::JoinSuccess {
                code: code.to_string(),
                players,
            }),
            subscription: Some(rx),
        },
        Err(e) => Dispatch::reply(ServerMessage::error(&e)),
    }
}

pub async fn handle_submit_answer(
    state: &Arc<AppState>,
    conn_id: &ConnectionId,
    code: &str,
    question_index: usize,
    answer_index: usize,
    time_remaining: f64,
) -> Dispatch {
    match state
        .clone()
        .submit_answer(conn_id, code, question_index, answer_index, time_remaining)
        .await
    {
        // Accepted, stale, and duplicate submissions are all silent: score
        // changes surface only at the reveal.
        Ok(()) => Dispatch::silent(),
        Err(e) => Dispatch::reply(ServerMessage::error(&e)),
    }
}
