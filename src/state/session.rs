use super::{rounds, AppState};
use crate::broadcast::SessionChannels;
use crate::code::SessionCode;
use crate::error::GameError;
use crate::protocol::{PlayerInfo, PlayerRoundResult, RoundOutcome, ServerMessage};
use crate::scheduler::RoundTimer;
use crate::scoring;
use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// One running quiz: roster, scores, question pointer, lifecycle state, and
/// the session-scoped timer and audiences. Always accessed through its
/// mutex in the registry.
pub struct GameSession {
    pub code: SessionCode,
    pub quiz: Quiz,
    pub state: SessionState,
    /// `None` while Waiting; `Some(i)` with `i < questions.len()` while
    /// Active. Advancing past the last question goes straight to Finished.
    pub current_question: Option<usize>,
    /// Joined players in join order. Join order doubles as the leaderboard
    /// tie-break.
    pub roster: Vec<Player>,
    /// Running totals, keyed by connection id. Kept in lockstep with the
    /// roster: a player is in both maps or in neither.
    pub scores: HashMap<ConnectionId, u32>,
    pub phase: RoundPhase,
    pub timer: RoundTimer,
    pub channels: SessionChannels,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(code: SessionCode, quiz: Quiz) -> Self {
        Self {
            code,
            quiz,
            state: SessionState::Waiting,
            current_question: None,
            roster: Vec::new(),
            scores: HashMap::new(),
            phase: RoundPhase::Idle,
            timer: RoundTimer::default(),
            channels: SessionChannels::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn score_of(&self, id: &ConnectionId) -> u32 {
        self.scores.get(id).copied().unwrap_or(0)
    }

    /// Full roster in join order, with running totals.
    pub fn roster_info(&self) -> Vec<PlayerInfo> {
        self.roster
            .iter()
            .map(|p| PlayerInfo::new(p, self.score_of(&p.id)))
            .collect()
    }

    /// Roster sorted by total score descending, truncated to `limit`.
    pub fn leaderboard(&self, limit: usize) -> Vec<PlayerInfo> {
        scoring::rank(&self.roster, &self.scores)
            .into_iter()
            .take(limit)
            .map(|i| PlayerInfo::new(&self.roster[i], self.score_of(&self.roster[i].id)))
            .collect()
    }

    /// Per-player outcomes for one question, sorted by total score. Every
    /// roster member appears; a missing submission is an explicit
    /// `NoAnswer`.
    pub fn round_results(&self, question_index: usize) -> Vec<PlayerRoundResult> {
        scoring::rank(&self.roster, &self.scores)
            .into_iter()
            .map(|i| {
                let player = &self.roster[i];
                PlayerRoundResult {
                    player: PlayerInfo::new(player, self.score_of(&player.id)),
                    outcome: RoundOutcome::from(player.answers.get(&question_index)),
                }
            })
            .collect()
    }

    /// True if every joined player has an accepted answer for the question.
    pub fn all_answered(&self, question_index: usize) -> bool {
        !self.roster.is_empty()
            && self
                .roster
                .iter()
                .all(|p| p.answers.contains_key(&question_index))
    }
}

impl AppState {
    /// Attach a host display to a session's host audience.
    pub async fn attach_host(
        &self,
        conn_id: &ConnectionId,
        raw_code: &str,
    ) -> Result<broadcast::Receiver<ServerMessage>, GameError> {
        if self.connections.read().await.contains_key(conn_id) {
            return Err(GameError::AlreadyJoined);
        }

        let session = self
            .lookup(raw_code)
            .await
            .ok_or(GameError::SessionNotFound)?;
        let session = session.lock().await;

        self.connections.write().await.insert(
            conn_id.clone(),
            Binding {
                code: session.code.clone(),
                role: Role::Host,
            },
        );

        tracing::info!("Host attached to session {}", session.code);
        Ok(session.channels.subscribe_host())
    }

    /// Join a waiting session as a player.
    ///
    /// On success the player is appended to the roster with a zero score,
    /// the connection is bound, and both audiences receive the full roster
    /// (full-roster broadcasts, not deltas, so late observers self-heal).
    pub async fn join_session(
        &self,
        conn_id: &ConnectionId,
        raw_code: &str,
        nickname: String,
        avatar: String,
    ) -> Result<(SessionCode, Vec<PlayerInfo>, broadcast::Receiver<ServerMessage>), GameError>
    {
        if self.connections.read().await.contains_key(conn_id) {
            return Err(GameError::AlreadyJoined);
        }

        let session = self
            .lookup(raw_code)
            .await
            .ok_or(GameError::SessionNotFound)?;
        let mut session = session.lock().await;

        if session.state != SessionState::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }

        session.roster.push(Player {
            id: conn_id.clone(),
            nickname: nickname.clone(),
            avatar,
            answers: HashMap::new(),
        });
        session.scores.insert(conn_id.clone(), 0);

        self.connections.write().await.insert(
            conn_id.clone(),
            Binding {
                code: session.code.clone(),
                role: Role::Player,
            },
        );

        let players = session.roster_info();
        session.channels.to_host(ServerMessage::PlayerJoined {
            players: players.clone(),
        });
        session.channels.to_players(ServerMessage::PlayersUpdate {
            players: players.clone(),
        });

        tracing::info!("Player {} joined session {}", nickname, session.code);
        Ok((
            session.code.clone(),
            players,
            session.channels.subscribe_players(),
        ))
    }

    /// Start the game. Host-only; legal only from Waiting.
    pub async fn start_game(
        self: Arc<Self>,
        conn_id: &ConnectionId,
        raw_code: &str,
    ) -> Result<(), GameError> {
        let code = SessionCode::parse(raw_code);
        self.require_binding(conn_id, &code, Role::Host).await?;

        let session = self.get(&code).await.ok_or(GameError::SessionNotFound)?;
        {
            let mut session = session.lock().await;
            if session.state != SessionState::Waiting {
                return Err(GameError::GameAlreadyStarted);
            }
            session.state = SessionState::Active;
            session.current_question = Some(0);
        }

        tracing::info!("Session {} started", code);
        rounds::begin_question(&self, &code).await;
        Ok(())
    }

    /// Record a player's answer for the current question.
    ///
    /// Stale/future question indices and duplicate submissions are dropped
    /// without an error — the sender has no way to act on one. An accepted
    /// answer updates the score only; nothing is broadcast until the
    /// reveal.
    pub async fn submit_answer(
        self: Arc<Self>,
        conn_id: &ConnectionId,
        raw_code: &str,
        question_index: usize,
        answer_index: usize,
        time_remaining: f64,
    ) -> Result<(), GameError> {
        let code = SessionCode::parse(raw_code);
        self.require_binding(conn_id, &code, Role::Player).await?;

        let session = self.get(&code).await.ok_or(GameError::SessionNotFound)?;
        let ended_early = {
            let mut session = session.lock().await;

            if session.state != SessionState::Active
                || session.phase != RoundPhase::Answering
                || session.current_question != Some(question_index)
            {
                tracing::debug!(
                    "Dropping answer for question {} in session {} (not the current window)",
                    question_index,
                    code
                );
                return Ok(());
            }

            let Some(question) = session.quiz.questions.get(question_index).cloned() else {
                return Ok(());
            };

            let Some(player) = session.roster.iter().position(|p| p.id == *conn_id) else {
                // Lost the race against a disconnect; the player is fully gone.
                return Ok(());
            };

            if session.roster[player].answers.contains_key(&question_index) {
                tracing::debug!(
                    "Dropping duplicate answer from {} for question {}",
                    conn_id,
                    question_index
                );
                return Ok(());
            }

            let clamped = time_remaining.clamp(0.0, question.time_limit as f64);
            let points = scoring::score(&question, answer_index, clamped);

            session.roster[player].answers.insert(
                question_index,
                AnswerRecord {
                    answer_index,
                    is_correct: answer_index == question.correct_answer,
                    points,
                    time_remaining: clamped,
                },
            );
            *session.scores.entry(conn_id.clone()).or_insert(0) += points;

            tracing::debug!(
                "Answer accepted from {} for question {} (+{} points)",
                conn_id,
                question_index,
                points
            );

            session.all_answered(question_index)
        };

        if ended_early {
            // Everyone has answered; close the window without waiting for
            // the timer. end_question re-checks the phase, so losing the
            // race to the timer is harmless.
            rounds::end_question(&self, &code, question_index, None).await;
        }
        Ok(())
    }

    /// Tear down a connection in any state.
    ///
    /// Removes the player from roster and scores together, removes the
    /// binding, and — in Waiting or Active — broadcasts the updated roster.
    /// In-flight timers are untouched; other players' scoring is
    /// unaffected.
    pub async fn disconnect(&self, conn_id: &ConnectionId) {
        let binding = self.connections.read().await.get(conn_id).cloned();
        let Some(binding) = binding else {
            return;
        };

        let session = self.get(&binding.code).await;
        if let Some(session) = session {
            let mut session = session.lock().await;

            if binding.role == Role::Player {
                session.roster.retain(|p| p.id != *conn_id);
                session.scores.remove(conn_id);

                self.connections.write().await.remove(conn_id);

                if matches!(
                    session.state,
                    SessionState::Waiting | SessionState::Active
                ) {
                    let players = session.roster_info();
                    session.channels.to_host(ServerMessage::PlayerLeft {
                        players: players.clone(),
                    });
                    session
                        .channels
                        .to_players(ServerMessage::PlayersUpdate { players });
                }
                tracing::info!("Player {} left session {}", conn_id, binding.code);
            } else {
                self.connections.write().await.remove(conn_id);
                tracing::info!("Host detached from session {}", binding.code);
            }
        } else {
            self.connections.write().await.remove(conn_id);
        }
    }

    /// Verify that `conn_id` is bound to `code` in the required role.
    async fn require_binding(
        &self,
        conn_id: &ConnectionId,
        code: &SessionCode,
        role: Role,
    ) -> Result<(), GameError> {
        match self.connections.read().await.get(conn_id) {
            Some(binding) if binding.code == *code && binding.role == role => Ok(()),
            _ => Err(GameError::Unauthorized),
        }
    }
}
