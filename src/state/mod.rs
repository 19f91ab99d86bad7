mod registry;
pub mod rounds;
mod session;

pub use session::GameSession;

use crate::code::SessionCode;
use crate::types::{Binding, ConnectionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state: the session registry and the connection
/// directory.
///
/// Each session is the unit of mutual exclusion — every operation on a
/// session (join, start, answer, disconnect, timer expiry) locks that
/// session's mutex, so operations serialize per session and run in parallel
/// across sessions. The outer maps are only held long enough to resolve a
/// code or a connection id.
pub struct AppState {
    pub sessions: RwLock<HashMap<SessionCode, Arc<Mutex<GameSession>>>>,
    pub connections: RwLock<HashMap<ConnectionId, Binding>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::sample_quiz;

    #[tokio::test]
    async fn test_create_session() {
        let state = AppState::new();
        let code = state.create_session(sample_quiz()).await;

        let session = state.lookup(code.as_str()).await.unwrap();
        let session = session.lock().await;
        assert_eq!(session.state, crate::types::SessionState::Waiting);
        assert_eq!(session.current_question, None);
        assert!(session.roster.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let state = AppState::new();
        let code_a = state.create_session(sample_quiz()).await;
        let code_b = state.create_session(sample_quiz()).await;

        assert_ne!(code_a, code_b);

        // Holding one session's lock must not block access to the other.
        let a = state.lookup(code_a.as_str()).await.unwrap();
        let _guard = a.lock().await;
        let b = state.lookup(code_b.as_str()).await.unwrap();
        assert!(b.try_lock().is_ok());
    }
}
