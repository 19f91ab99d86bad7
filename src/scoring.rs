//! Scoring engine.
//!
//! Pure functions: no clocks, no state. The session calls [`score`] at
//! answer acceptance time and [`rank`] whenever a leaderboard is built.

use crate::types::{ConnectionId, Player, Question};
use std::collections::HashMap;

/// Base points for a correct answer.
pub const BASE_POINTS: u32 = 1000;
/// Maximum speed bonus for answering with the full window remaining.
pub const MAX_TIME_BONUS: u32 = 500;

/// Points for a single answer.
///
/// `time_remaining` is client-claimed and is clamped to
/// `[0, question.time_limit]` before use so a misbehaving or slow client can
/// neither inflate the bonus nor push it negative.
pub fn score(question: &Question, answer_index: usize, time_remaining: f64) -> u32 {
    if answer_index != question.correct_answer {
        return 0;
    }
    let limit = question.time_limit as f64;
    let remaining = time_remaining.clamp(0.0, limit);
    let bonus = ((remaining / limit) * MAX_TIME_BONUS as f64).floor() as u32;
    BASE_POINTS + bonus
}

/// Roster indices ordered by total score descending.
///
/// Ties break by roster join order (earlier joiner first). Join order is
/// immutable for a session's lifetime, so the ranking is deterministic and
/// stable across re-sorts.
pub fn rank(roster: &[Player], scores: &HashMap<ConnectionId, u32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..roster.len()).collect();
    order.sort_by_key(|&i| {
        let total = scores.get(&roster[i].id).copied().unwrap_or(0);
        (std::cmp::Reverse(total), i)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            text: "2 + 2?".to_string(),
            answers: vec!["3".to_string(), "4".to_string()],
            correct_answer: 1,
            time_limit: 10,
        }
    }

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            nickname: id.to_string(),
            avatar: "🦊".to_string(),
            answers: HashMap::new(),
        }
    }

    #[test]
    fn incorrect_answer_scores_zero() {
        assert_eq!(score(&question(), 0, 10.0), 0);
        assert_eq!(score(&question(), 0, 0.0), 0);
    }

    #[test]
    fn correct_answer_with_half_time_left() {
        // 1000 + floor(5/10 * 500) = 1250
        assert_eq!(score(&question(), 1, 5.0), 1250);
    }

    #[test]
    fn full_and_zero_time_bounds() {
        assert_eq!(score(&question(), 1, 10.0), 1500);
        assert_eq!(score(&question(), 1, 0.0), 1000);
    }

    #[test]
    fn claimed_time_is_clamped() {
        // Inflated claim caps at the full bonus, negative claim at none.
        assert_eq!(score(&question(), 1, 99.0), 1500);
        assert_eq!(score(&question(), 1, -3.0), 1000);
    }

    #[test]
    fn score_is_monotone_in_time_remaining() {
        let q = question();
        let mut last = u32::MAX;
        for tenths in (0..=100).rev() {
            let s = score(&q, 1, tenths as f64 / 10.0);
            assert!(s <= last);
            last = s;
        }
    }

    #[test]
    fn rank_sorts_descending_with_join_order_ties() {
        let roster = vec![player("a"), player("b"), player("c")];
        let scores = HashMap::from([
            ("a".to_string(), 1000),
            ("b".to_string(), 1500),
            ("c".to_string(), 1000),
        ]);
        // b first, then a before c (same score, a joined earlier)
        assert_eq!(rank(&roster, &scores), vec![1, 0, 2]);
    }

    #[test]
    fn rank_is_stable_across_resorts() {
        let roster = vec![player("a"), player("b")];
        let scores = HashMap::from([("a".to_string(), 700), ("b".to_string(), 700)]);
        let first = rank(&roster, &scores);
        for _ in 0..5 {
            assert_eq!(rank(&roster, &scores), first);
        }
    }
}
