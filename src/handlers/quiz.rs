// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{Extension, Json, extract::Path, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::{PgPool, types::Json as SqlJson};

use crate::{
    config::QUESTIONS_PER_MATERIAL,
    error::AppError,
    handlers::badge::update_user_badge,
    leveling::{level_for_xp, level_name},
    models::{
        progress::{
            AnswerOutcome, LeaderboardEntry, PageScore, PageScores, QuizProgress,
            SubmitAnswerRequest,
        },
        question::{PublicQuestion, Question},
    },
    scoring::{answer_delta, attempt_xp, best_xp},
    utils::jwt::Claims,
};
use validator::Validate;

/// Lists a material's quiz questions in page order, answers hidden.
pub async fn get_material_quiz(
    State(pool): State<PgPool>,
    Path(material_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, material_id, page_number, content, options, answer_index, created_at
        FROM questions
        WHERE material_id = $1
        ORDER BY page_number ASC
        "#,
    )
    .bind(material_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch quiz questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if questions.is_empty() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let public: Vec<PublicQuestion> = questions.into_iter().map(PublicQuestion::from).collect();

    Ok(Json(public))
}

/// Submits a user's answer for one material page and settles both score
/// ledgers.
///
/// * Looks up the stored correct answer for (material, page).
/// * Overwrites the page's entry in the per-page score map.
/// * Adjusts `total_answered`/`total_correct` by delta so the counters
///   always match a recount of the map, however often a page is
///   re-answered.
/// * Mirrors the same deltas into the per-material progress row; once all
///   pages are answered the material is completed and `xp_earned` is
///   settled best-of-attempts, so a weaker retake never lowers it.
///
/// The whole read-adjust-write sequence runs in one transaction with the
/// ledger rows locked, so concurrent submissions for the same pair cannot
/// settle from a stale snapshot.
pub async fn submit_answer(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id();

    let mut tx = pool.begin().await?;

    // 1. Correct-answer lookup
    let question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, material_id, page_number, content, options, answer_index, created_at
        FROM questions
        WHERE material_id = $1 AND page_number = $2
        "#,
    )
    .bind(payload.material_id)
    .bind(payload.page_number)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let is_correct = payload.selected_answer == question.answer_index;

    // 2. Page-score ledger
    let existing = sqlx::query_as::<_, PageScores>(
        r#"
        SELECT user_id, material_id, scores, total_correct, total_answered, updated_at
        FROM page_scores
        WHERE user_id = $1 AND material_id = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(payload.material_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (prev_total_correct, prev_total_answered) = existing
        .as_ref()
        .map(|r| (r.total_correct, r.total_answered))
        .unwrap_or((0, 0));

    let mut scores: HashMap<String, PageScore> =
        existing.map(|r| r.scores.0).unwrap_or_default();

    let page_key = payload.page_number.to_string();
    let prior = scores.get(&page_key);
    let delta = answer_delta(
        prior.is_some(),
        prior.map(PageScore::is_correct).unwrap_or(false),
        is_correct,
    );

    // Newest submission always replaces the page entry, right or wrong.
    scores.insert(
        page_key,
        PageScore {
            result: if is_correct {
                AnswerOutcome::Correct
            } else {
                AnswerOutcome::Incorrect
            },
            selected_answer: payload.selected_answer,
            answered_at: Utc::now(),
        },
    );

    let total_correct = prev_total_correct + delta.correct;
    let total_answered = prev_total_answered + delta.answered;

    sqlx::query(
        r#"
        INSERT INTO page_scores (user_id, material_id, scores, total_correct, total_answered, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (user_id, material_id) DO UPDATE SET
            scores = EXCLUDED.scores,
            total_correct = EXCLUDED.total_correct,
            total_answered = EXCLUDED.total_answered,
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(payload.material_id)
    .bind(SqlJson(&scores))
    .bind(total_correct)
    .bind(total_answered)
    .execute(&mut *tx)
    .await?;

    // 3. Per-material progress ledger
    let progress = sqlx::query_as::<_, QuizProgress>(
        r#"
        SELECT user_id, material_id, questions_answered, correct_answers, xp_earned, is_completed, updated_at
        FROM quiz_progress
        WHERE user_id = $1 AND material_id = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(payload.material_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (prev_answered, prev_correct, prev_xp, prev_completed) = progress
        .map(|p| (p.questions_answered, p.correct_answers, p.xp_earned, p.is_completed))
        .unwrap_or((0, 0, 0, false));

    let questions_answered = prev_answered + delta.answered;
    let correct_answers = prev_correct + delta.correct;

    let mut is_completed = prev_completed;
    let mut xp_earned = prev_xp;
    if questions_answered >= QUESTIONS_PER_MATERIAL {
        is_completed = true;
        xp_earned = best_xp(prev_xp, attempt_xp(correct_answers));
    }

    sqlx::query(
        r#"
        INSERT INTO quiz_progress (user_id, material_id, questions_answered, correct_answers, xp_earned, is_completed, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW())
        ON CONFLICT (user_id, material_id) DO UPDATE SET
            questions_answered = EXCLUDED.questions_answered,
            correct_answers = EXCLUDED.correct_answers,
            xp_earned = EXCLUDED.xp_earned,
            is_completed = EXCLUDED.is_completed,
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(payload.material_id)
    .bind(questions_answered)
    .bind(correct_answers)
    .bind(xp_earned)
    .bind(is_completed)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    // 4. Completed materials can move total XP, so refresh the stored badge.
    if is_completed {
        update_user_badge(&pool, user_id).await?;
    }

    Ok(Json(serde_json::json!({
        "is_correct": is_correct,
        "correct_answer": question.answer_index,
        "total_correct": total_correct,
        "total_answered": total_answered,
        "xp_earned": xp_earned,
        "is_completed": is_completed
    })))
}

/// Returns the caller's progress and page-score history for a material.
pub async fn get_material_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(material_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let progress = sqlx::query_as::<_, QuizProgress>(
        r#"
        SELECT user_id, material_id, questions_answered, correct_answers, xp_earned, is_completed, updated_at
        FROM quiz_progress
        WHERE user_id = $1 AND material_id = $2
        "#,
    )
    .bind(user_id)
    .bind(material_id)
    .fetch_optional(&pool)
    .await?;

    let page_scores = sqlx::query_as::<_, PageScores>(
        r#"
        SELECT user_id, material_id, scores, total_correct, total_answered, updated_at
        FROM page_scores
        WHERE user_id = $1 AND material_id = $2
        "#,
    )
    .bind(user_id)
    .bind(material_id)
    .fetch_optional(&pool)
    .await?;

    Ok(Json(serde_json::json!({
        "progress": progress,
        "page_scores": page_scores
    })))
}

#[derive(sqlx::FromRow)]
struct XpRow {
    username: String,
    total_xp: i64,
}

/// Retrieves the top 10 users by accumulated XP.
pub async fn get_leaderboard(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, XpRow>(
        r#"
        SELECT u.username, COALESCE(SUM(qp.xp_earned), 0)::BIGINT AS total_xp
        FROM users u
        LEFT JOIN quiz_progress qp ON qp.user_id = u.id
        GROUP BY u.id, u.username
        ORDER BY total_xp DESC, u.id ASC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let leaderboard: Vec<LeaderboardEntry> = rows
        .into_iter()
        .map(|row| {
            let level = level_for_xp(row.total_xp);
            LeaderboardEntry {
                username: row.username,
                total_xp: row.total_xp,
                level,
                level_name: level_name(level),
            }
        })
        .collect();

    Ok(Json(leaderboard))
}
