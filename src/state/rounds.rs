//! Question round flow.
//!
//! Each round is two sequential, cancellable timers owned by the session:
//! the answer window (the question's time limit) and the reveal window
//! (fixed). Timer expiry is the only spontaneous source of state
//! transitions; every entry point here re-locks the session and verifies it
//! is still in the state the caller saw, so a fire against a superseded
//! state is discarded, never applied.

use super::AppState;
use crate::code::SessionCode;
use crate::protocol::ServerMessage;
use crate::types::{RoundPhase, SessionState};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Seconds the reveal stays on screen before the next question.
pub const REVEAL_SECONDS: u64 = 5;
/// Entries shown on the player-facing leaderboard at reveal.
pub const LEADERBOARD_LIMIT: usize = 10;

/// How often the reaper sweeps the registry.
const REAPER_INTERVAL: Duration = Duration::from_secs(60);
/// How long a finished session stays addressable for late result reads.
const FINISHED_GRACE_SECONDS: i64 = 300;

/// Open the answer window for the session's current question and arm its
/// expiry timer. The host receives the full question; players receive the
/// answer options only.
pub fn begin_question<'a>(
    state: &'a Arc<AppState>,
    code: &'a SessionCode,
) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
    Box::pin(async move {
    let Some(session) = state.get(code).await else {
        return;
    };
    let mut session = session.lock().await;

    if session.state != SessionState::Active {
        return;
    }
    let Some(index) = session.current_question else {
        return;
    };
    let Some(question) = session.quiz.questions.get(index).cloned() else {
        return;
    };

    session.phase = RoundPhase::Answering;

    session.channels.to_host(ServerMessage::QuestionStart {
        question: question.clone(),
        question_index: index,
        total_questions: session.quiz.questions.len(),
    });
    session.channels.to_players(ServerMessage::QuestionStartPlayer {
        question_index: index,
        time_limit: question.time_limit,
        answers: question.answers.clone(),
    });

    let epoch = session.timer.begin_phase();
    let handle = tokio::spawn({
        let state = state.clone();
        let code = code.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(question.time_limit)).await;
            end_question(&state, &code, index, Some(epoch)).await;
        }
    });
    session.timer.store(handle);

    tracing::debug!("Question {} started in session {}", index, code);
    })
}

/// Close the answer window, broadcast results, and arm the reveal timer.
///
/// Called from the answer-window timer (with its captured epoch) or
/// directly when every player has answered (`epoch: None`). Whichever path
/// runs second finds the phase already moved on and does nothing.
pub async fn end_question(
    state: &Arc<AppState>,
    code: &SessionCode,
    question_index: usize,
    epoch: Option<u64>,
) {
    let Some(session) = state.get(code).await else {
        tracing::debug!("Timer fired for removed session {}", code);
        return;
    };
    let mut session = session.lock().await;

    if session.state != SessionState::Active
        || session.phase != RoundPhase::Answering
        || session.current_question != Some(question_index)
    {
        tracing::debug!(
            "Discarding question-end for superseded state in session {}",
            code
        );
        return;
    }
    if let Some(epoch) = epoch {
        if !session.timer.matches(epoch) {
            tracing::debug!("Discarding stale answer-window timer in session {}", code);
            return;
        }
    }

    let Some(question) = session.quiz.questions.get(question_index).cloned() else {
        return;
    };

    session.phase = RoundPhase::Reveal;

    session.channels.to_host(ServerMessage::QuestionEnd {
        correct_answer: question.correct_answer,
        correct_text: question.answers[question.correct_answer].clone(),
        results: session.round_results(question_index),
        question_index,
    });
    session.channels.to_players(ServerMessage::QuestionEndPlayer {
        correct_answer: question.correct_answer,
        correct_text: question.answers[question.correct_answer].clone(),
        leaderboard: session.leaderboard(LEADERBOARD_LIMIT),
    });

    let epoch = session.timer.begin_phase();
    let handle = tokio::spawn({
        let state = state.clone();
        let code = code.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(REVEAL_SECONDS)).await;
            advance_round(&state, &code, question_index, epoch).await;
        }
    });
    session.timer.store(handle);

    tracing::debug!("Question {} ended in session {}", question_index, code);
}

/// Leave the reveal: begin the next question, or finish the game if the
/// quiz is exhausted.
pub async fn advance_round(
    state: &Arc<AppState>,
    code: &SessionCode,
    from_index: usize,
    epoch: u64,
) {
    let Some(session) = state.get(code).await else {
        return;
    };
    let next = {
        let mut session = session.lock().await;

        if session.state != SessionState::Active
            || session.phase != RoundPhase::Reveal
            || session.current_question != Some(from_index)
            || !session.timer.matches(epoch)
        {
            tracing::debug!("Discarding stale reveal timer in session {}", code);
            return;
        }

        let next = from_index + 1;
        if next < session.quiz.questions.len() {
            session.current_question = Some(next);
            Some(next)
        } else {
            session.state = SessionState::Finished;
            session.current_question = None;
            session.phase = RoundPhase::Idle;
            session.timer.cancel();
            session.finished_at = Some(Utc::now());

            let results = session.leaderboard(usize::MAX);
            session.channels.to_host(ServerMessage::GameEnd {
                results: results.clone(),
            });
            session
                .channels
                .to_players(ServerMessage::GameEndPlayer { results });

            tracing::info!("Session {} finished", code);
            None
        }
    };

    if next.is_some() {
        begin_question(state, code).await;
    }
}

/// Background sweep that removes sessions finished long enough ago.
/// Finished sessions stay addressable for late result reads until the
/// grace period runs out.
pub fn spawn_session_reaper(state: Arc<AppState>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(REAPER_INTERVAL).await;

            let candidates: Vec<SessionCode> = {
                let sessions = state.sessions.read().await;
                let mut expired = Vec::new();
                for (code, session) in sessions.iter() {
                    let session = session.lock().await;
                    if let Some(finished_at) = session.finished_at {
                        if (Utc::now() - finished_at).num_seconds() > FINISHED_GRACE_SECONDS {
                            expired.push(code.clone());
                        }
                    }
                }
                expired
            };

            for code in candidates {
                tracing::info!("Reaping finished session {}", code);
                state.remove_session(&code).await;
            }
        }
    });
}
