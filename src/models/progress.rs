// src/models/progress.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'quiz_progress' table: one row per (user, material).
///
/// `xp_earned` holds the best-of-attempts score and never decreases;
/// rows are created on first quiz interaction and never deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizProgress {
    pub user_id: i64,
    pub material_id: i64,
    pub questions_answered: i64,
    pub correct_answers: i64,
    pub xp_earned: i64,
    pub is_completed: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of a single page answer as stored in the page-score map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

/// One entry of the per-page score map. Re-answering a page overwrites
/// its entry with the newest submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageScore {
    pub result: AnswerOutcome,
    pub selected_answer: i32,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

impl PageScore {
    pub fn is_correct(&self) -> bool {
        self.result == AnswerOutcome::Correct
    }
}

/// Represents the 'page_scores' table: the per-(user, material) answer
/// history keyed by page number. The counters are an incremental view
/// over `scores` and must always match a recount of the map.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageScores {
    pub user_id: i64,
    pub material_id: i64,
    pub scores: Json<HashMap<String, PageScore>>,
    pub total_correct: i64,
    pub total_answered: i64,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting one quiz answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub material_id: i64,
    #[validate(range(min = 1, message = "Page numbers start at 1."))]
    pub page_number: i32,
    #[validate(range(min = 0, message = "Answer index cannot be negative."))]
    pub selected_answer: i32,
}

/// One leaderboard row: total XP with the derived level attached.
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total_xp: i64,
    pub level: i64,
    pub level_name: &'static str,
}
