use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Host display attaches to a session's host audience.
    AdminJoin {
        code: String,
    },
    /// Player joins a waiting session.
    JoinGame {
        code: String,
        nickname: String,
        avatar: String,
    },
    /// Host starts the game.
    StartGame {
        code: String,
    },
    /// Player submits an answer for the current question.
    SubmitAnswer {
        code: String,
        question_index: usize,
        answer_index: usize,
        time_remaining: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to the joining player only.
    JoinSuccess {
        code: String,
        players: Vec<PlayerInfo>,
    },
    /// Full roster, sent to the player audience.
    PlayersUpdate {
        players: Vec<PlayerInfo>,
    },
    /// Full roster, sent to the host when a player joins.
    PlayerJoined {
        players: Vec<PlayerInfo>,
    },
    /// Full roster, sent to the host when a player leaves.
    PlayerLeft {
        players: Vec<PlayerInfo>,
    },
    /// Host-only: the full question, including the correct answer.
    QuestionStart {
        question: Question,
        question_index: usize,
        total_questions: usize,
    },
    /// Player view of a question: answer options only, never the correct
    /// index.
    QuestionStartPlayer {
        question_index: usize,
        time_limit: u64,
        answers: Vec<String>,
    },
    /// Host-only reveal: every roster member's outcome for the round.
    QuestionEnd {
        correct_answer: usize,
        correct_text: String,
        results: Vec<PlayerRoundResult>,
        question_index: usize,
    },
    /// Player reveal: the correct answer and the top of the leaderboard.
    QuestionEndPlayer {
        correct_answer: usize,
        correct_text: String,
        leaderboard: Vec<PlayerInfo>,
    },
    GameEnd {
        results: Vec<PlayerInfo>,
    },
    GameEndPlayer {
        results: Vec<PlayerInfo>,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(err: &crate::error::GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}

/// Public roster entry with the running total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub id: ConnectionId,
    pub nickname: String,
    pub avatar: String,
    pub score: u32,
}

impl PlayerInfo {
    pub fn new(player: &Player, score: u32) -> Self {
        Self {
            id: player.id.clone(),
            nickname: player.nickname.clone(),
            avatar: player.avatar.clone(),
            score,
        }
    }
}

/// What a player did in one round. Always present for every roster entry at
/// reveal time; a missing submission is an explicit variant, not a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundOutcome {
    Answered {
        answer_index: usize,
        correct: bool,
        points: u32,
        time_remaining: f64,
    },
    NoAnswer,
}

impl From<Option<&AnswerRecord>> for RoundOutcome {
    fn from(record: Option<&AnswerRecord>) -> Self {
        match record {
            Some(r) => RoundOutcome::Answered {
                answer_index: r.answer_index,
                correct: r.is_correct,
                points: r.points,
                time_remaining: r.time_remaining,
            },
            None => RoundOutcome::NoAnswer,
        }
    }
}

/// Host-only per-player reveal entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRoundResult {
    #[serde(flatten)]
    pub player: PlayerInfo,
    #[serde(flatten)]
    pub outcome: RoundOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_parse_from_tagged_json() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"t":"submit_answer","code":"ab2cd3","question_index":0,"answer_index":2,"time_remaining":4.5}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::SubmitAnswer {
                question_index,
                answer_index,
                ..
            } => {
                assert_eq!(question_index, 0);
                assert_eq!(answer_index, 2);
            }
            _ => panic!("Expected SubmitAnswer"),
        }
    }

    #[test]
    fn player_question_start_never_carries_the_correct_index() {
        let msg = ServerMessage::QuestionStartPlayer {
            question_index: 0,
            time_limit: 10,
            answers: vec!["red".to_string(), "blue".to_string()],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("correct"));
    }

    #[test]
    fn no_answer_outcome_is_explicit() {
        let outcome = RoundOutcome::from(None);
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("no_answer"));
    }
}
