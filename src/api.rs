//! HTTP collaborator endpoints.
//!
//! These are the simple request/response operations around the core: quiz
//! creation (which binds a new session in the registry), session snapshot
//! reads, and the avatar catalog. None of them hold a session's lock across
//! external work.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::protocol::PlayerInfo;
use crate::state::AppState;
use crate::types::{Question, Quiz, SessionState};

/// Avatar options for players
pub const AVATARS: &[&str] = &[
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐸", "🐙", "🦄", "🐲",
    "🤖", "👽", "🎭", "🎨", "🎯",
];

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateQuizResponse {
    pub code: String,
    pub quiz_id: String,
}

/// Read-only session view. Question bodies are deliberately absent: the
/// correct answer must never be readable outside the host channel before
/// the reveal.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub code: String,
    pub title: String,
    pub state: SessionState,
    pub current_question: Option<usize>,
    pub total_questions: usize,
    pub players: Vec<PlayerInfo>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

fn validate_quiz(req: &CreateQuizRequest) -> Result<(), String> {
    if req.title.trim().is_empty() {
        return Err("Quiz title must not be empty".to_string());
    }
    if req.questions.is_empty() {
        return Err("Quiz must have at least one question".to_string());
    }
    for (i, q) in req.questions.iter().enumerate() {
        if q.answers.len() < 2 {
            return Err(format!("Question {} needs at least two answers", i));
        }
        if q.correct_answer >= q.answers.len() {
            return Err(format!("Question {} has an out-of-range correct answer", i));
        }
        if q.time_limit == 0 {
            return Err(format!("Question {} needs a nonzero time limit", i));
        }
    }
    Ok(())
}

/// Create a quiz and bind a new session for it.
///
/// POST /api/quiz
pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuizRequest>,
) -> Response {
    if let Err(e) = validate_quiz(&req) {
        tracing::warn!("Rejected quiz: {}", e);
        return (StatusCode::BAD_REQUEST, e).into_response();
    }

    let quiz = Quiz {
        id: ulid::Ulid::new().to_string(),
        title: req.title,
        description: req.description,
        questions: req.questions,
    };
    let quiz_id = quiz.id.clone();

    let code = state.create_session(quiz).await;

    Json(CreateQuizResponse {
        code: code.to_string(),
        quiz_id,
    })
    .into_response()
}

/// Look up a session by code (case-insensitive).
///
/// GET /api/game/{code}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    match state.lookup(&code).await {
        Some(session) => {
            let session = session.lock().await;
            Json(SessionSnapshot {
                code: session.code.to_string(),
                title: session.quiz.title.clone(),
                state: session.state,
                current_question: session.current_question,
                total_questions: session.quiz.questions.len(),
                players: session.roster_info(),
                created_at: session.created_at,
            })
            .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Game not found").into_response(),
    }
}

/// List the avatar catalog.
///
/// GET /api/avatars
pub async fn list_avatars() -> Json<Vec<&'static str>> {
    Json(AVATARS.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateQuizRequest {
        CreateQuizRequest {
            title: "Capitals".to_string(),
            description: String::new(),
            questions: vec![Question {
                text: "Capital of France?".to_string(),
                answers: vec!["Lyon".to_string(), "Paris".to_string()],
                correct_answer: 1,
                time_limit: 10,
            }],
        }
    }

    #[test]
    fn accepts_a_valid_quiz() {
        assert!(validate_quiz(&valid_request()).is_ok());
    }

    #[test]
    fn rejects_an_empty_quiz() {
        let mut req = valid_request();
        req.questions.clear();
        assert!(validate_quiz(&req).unwrap_err().contains("at least one"));
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let mut req = valid_request();
        req.questions[0].correct_answer = 2;
        assert!(validate_quiz(&req).unwrap_err().contains("out-of-range"));
    }

    #[test]
    fn rejects_single_answer_questions() {
        let mut req = valid_request();
        req.questions[0].answers.truncate(1);
        assert!(validate_quiz(&req).unwrap_err().contains("two answers"));
    }

    #[test]
    fn rejects_zero_time_limit() {
        let mut req = valid_request();
        req.questions[0].time_limit = 0;
        assert!(validate_quiz(&req).unwrap_err().contains("time limit"));
    }

    #[test]
    fn avatar_catalog_is_stable_and_ordered() {
        assert_eq!(AVATARS.len(), 20);
        assert_eq!(AVATARS[0], "🐶");
    }
}
