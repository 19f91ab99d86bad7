//! Domain error taxonomy.
//!
//! Every player-facing failure is delivered as a single `error {code, msg}`
//! message on the originating connection only. Stale and duplicate answer
//! submissions are not errors; they are silently dropped by the session.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Unknown or expired session code.
    #[error("Game not found")]
    SessionNotFound,

    /// Join attempted after the session left the Waiting state, or a second
    /// start was issued while Active.
    #[error("Game has already started")]
    GameAlreadyStarted,

    /// The connection is already bound to a session.
    #[error("Connection already joined a game")]
    AlreadyJoined,

    /// Action from a connection that is not bound to that session in the
    /// required role.
    #[error("Connection is not part of this game")]
    Unauthorized,
}

impl GameError {
    /// Stable wire code for the client.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::SessionNotFound => "SESSION_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::AlreadyJoined => "ALREADY_JOINED",
            GameError::Unauthorized => "UNAUTHORIZED",
        }
    }
}
