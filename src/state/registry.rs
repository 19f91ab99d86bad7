use super::{AppState, GameSession};
use crate::code::SessionCode;
use crate::types::Quiz;
use std::sync::Arc;
use tokio::sync::Mutex;

impl AppState {
    /// Register a new session for `quiz` and return its code.
    ///
    /// Codes are generated until one misses the live map; the check and the
    /// insert happen under the same write lock, so a code is never issued
    /// twice while its session is alive.
    pub async fn create_session(&self, quiz: Quiz) -> SessionCode {
        let mut sessions = self.sessions.write().await;

        let code = loop {
            let candidate = SessionCode::generate();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            // Collision - try again
        };

        let session = GameSession::new(code.clone(), quiz);
        sessions.insert(code.clone(), Arc::new(Mutex::new(session)));

        tracing::info!("Session created: {}", code);
        code
    }

    /// Case-insensitive lookup by raw client-supplied code.
    pub async fn lookup(&self, raw_code: &str) -> Option<Arc<Mutex<GameSession>>> {
        self.get(&SessionCode::parse(raw_code)).await
    }

    pub async fn get(&self, code: &SessionCode) -> Option<Arc<Mutex<GameSession>>> {
        self.sessions.read().await.get(code).cloned()
    }

    /// Destroy a session: abort its timers, drop its audiences, and purge
    /// every connection binding that pointed at it. Only after this may the
    /// code be reissued.
    pub async fn remove_session(&self, code: &SessionCode) {
        let removed = self.sessions.write().await.remove(code);

        if let Some(session) = removed {
            session.lock().await.timer.cancel();
            self.connections
                .write()
                .await
                .retain(|_, binding| binding.code != *code);
            tracing::info!("Session removed: {}", code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::sample_quiz;
    use crate::types::Role;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let state = AppState::new();
        let code = state.create_session(sample_quiz()).await;

        let lower = code.as_str().to_ascii_lowercase();
        assert!(state.lookup(&lower).await.is_some());
        assert!(state.lookup(code.as_str()).await.is_some());
    }

    #[tokio::test]
    async fn lookup_unknown_code_misses() {
        let state = AppState::new();
        assert!(state.lookup("ZZZZ99").await.is_none());
    }

    #[tokio::test]
    async fn live_codes_are_never_reissued() {
        let state = AppState::new();
        let mut codes = std::collections::HashSet::new();
        for _ in 0..50 {
            let code = state.create_session(sample_quiz()).await;
            assert!(codes.insert(code), "code issued twice while live");
        }
    }

    #[tokio::test]
    async fn removal_purges_bindings_and_frees_the_code() {
        let state = AppState::new();
        let code = state.create_session(sample_quiz()).await;

        state.connections.write().await.insert(
            "conn-1".to_string(),
            crate::types::Binding {
                code: code.clone(),
                role: Role::Player,
            },
        );

        state.remove_session(&code).await;

        assert!(state.lookup(code.as_str()).await.is_none());
        assert!(state.connections.read().await.is_empty());
    }
}
