// src/scoring.rs
//
// Pure score-ledger arithmetic for quiz submissions. The handlers apply
// these deltas inside a transaction; keeping the rules here makes the
// invariant (counters == recount of the page map) testable without a
// database.

use crate::config::XP_PER_QUESTION;

/// Counter adjustment produced by one answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerDelta {
    pub answered: i64,
    pub correct: i64,
}

/// Computes how `total_answered` / `total_correct` change when a page is
/// answered.
///
/// * `total_answered` grows only the first time a page is answered.
/// * `total_correct` moves by +1 when a page becomes correct (first answer
///   or a corrected retry), by -1 when a previously correct page is
///   re-answered wrong, and is otherwise untouched.
///
/// Applying this delta on every submission keeps the counters equal to a
/// full recount of the per-page map, no matter how often pages are
/// re-answered.
pub fn answer_delta(was_answered: bool, was_correct: bool, is_correct: bool) -> AnswerDelta {
    let answered = if was_answered { 0 } else { 1 };

    let correct = match (was_answered, was_correct, is_correct) {
        (false, _, true) => 1,
        (true, false, true) => 1,
        (true, true, false) => -1,
        _ => 0,
    };

    AnswerDelta { answered, correct }
}

/// XP earned by a completed attempt with `correct_answers` correct pages.
pub fn attempt_xp(correct_answers: i64) -> i64 {
    correct_answers.max(0) * XP_PER_QUESTION
}

/// Best-of-attempts rule: XP for a material never decreases across
/// retakes.
pub fn best_xp(previous_best: i64, current_attempt: i64) -> i64 {
    previous_best.max(current_attempt)
}
