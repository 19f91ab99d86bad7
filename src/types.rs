use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type QuizId = String;

/// A single quiz question with its answer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Ordered answer options (2 or more).
    pub answers: Vec<String>,
    /// Index into `answers`.
    pub correct_answer: usize,
    /// Answer window length in seconds.
    pub time_limit: u64,
}

/// An immutable quiz definition. Owned by a session for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Waiting,
    Active,
    Finished,
}

/// Phase within one question round. `Idle` outside of Active rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Answering,
    Reveal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
}

/// A player's accepted answer for one question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer_index: usize,
    pub is_correct: bool,
    pub points: u32,
    /// Client-claimed seconds remaining, clamped to the question's limit.
    pub time_remaining: f64,
}

/// A joined participant. Created only by a successful join, removed from
/// the roster and score map together on disconnect.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: ConnectionId,
    pub nickname: String,
    pub avatar: String,
    /// question index -> accepted answer
    pub answers: std::collections::HashMap<usize, AnswerRecord>,
}

/// Connection Directory entry: the only path from a raw connection id back
/// to its session.
#[derive(Debug, Clone)]
pub struct Binding {
    pub code: crate::code::SessionCode,
    pub role: Role,
}
