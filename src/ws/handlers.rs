//! WebSocket message dispatch
//!
//! This module provides the main entry point for handling client messages.
//! Binding/authorization checks live in the state layer; dispatch here only
//! routes to the role-specific handler modules.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::ConnectionId;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{host, player};

/// Result of handling one client message: an optional direct reply on the
/// originating connection, and an optional audience subscription when the
/// connection attached to a session.
pub struct Dispatch {
    pub reply: Option<ServerMessage>,
    pub subscription: Option<broadcast::Receiver<ServerMessage>>,
}

impl Dispatch {
    pub fn reply(msg: ServerMessage) -> Self {
        Self {
            reply: Some(msg),
            subscription: None,
        }
    }

    pub fn silent() -> Self {
        Self {
            reply: None,
            subscription: None,
        }
    }
}

/// Handle a client message and return what should go back on this
/// connection.
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: &ConnectionId,
    state: &Arc<AppState>,
) -> Dispatch {
    match msg {
        ClientMessage::AdminJoin { code } => host::handle_admin_join(state, conn_id, &code).await,
        ClientMessage::StartGame { code } => host::handle_start_game(state, conn_id, &code).await,
        ClientMessage::JoinGame {
            code,
            nickname,
            avatar,
        } => player::handle_join_game(state, conn_id, &code, nickname, avatar).await,
        ClientMessage::SubmitAnswer {
            code,
            question_index,
            answer_index,
            time_remaining,
        } => {
            player::handle_submit_answer(
                state,
                conn_id,
                &code,
                question_index,
                answer_index,
                time_remaining,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::sample_quiz;

    #[tokio::test]
    async fn start_from_unbound_connection_is_unauthorized() {
        let state = Arc::new(AppState::new());
        let code = state.create_session(sample_quiz()).await;

        let outcome = handle_message(
            ClientMessage::StartGame {
                code: code.as_str().to_string(),
            },
            &"conn-1".to_string(),
            &state,
        )
        .await;

        match outcome.reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "UNAUTHORIZED"),
            other => panic!("Expected UNAUTHORIZED error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn join_replies_with_the_roster_and_subscribes() {
        let state = Arc::new(AppState::new());
        let code = state.create_session(sample_quiz()).await;

        let outcome = handle_message(
            ClientMessage::JoinGame {
                code: code.as_str().to_string(),
                nickname: "Alice".to_string(),
                avatar: "🦊".to_string(),
            },
            &"conn-1".to_string(),
            &state,
        )
        .await;

        assert!(outcome.subscription.is_some());
        match outcome.reply {
            Some(ServerMessage::JoinSuccess { players, .. }) => assert_eq!(players.len(), 1),
            other => panic!("Expected JoinSuccess, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn join_with_unknown_code_reports_session_not_found() {
        let state = Arc::new(AppState::new());

        let outcome = handle_message(
            ClientMessage::JoinGame {
                code: "ZZZZ99".to_string(),
                nickname: "Alice".to_string(),
                avatar: "🦊".to_string(),
            },
            &"conn-1".to_string(),
            &state,
        )
        .await;

        match outcome.reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "SESSION_NOT_FOUND"),
            other => panic!("Expected SESSION_NOT_FOUND error, got {:?}", other),
        }
    }
}
