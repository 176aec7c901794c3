// src/handlers/profile.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::badge::{badge_for_level, total_xp, unlocked_badges},
    leveling::{level_info, level_style},
    models::{progress::QuizProgress, user::MeResponse, user::User},
    utils::jwt::Claims,
};

/// Get current user's profile with the derived gamification state.
///
/// A badge catalog gap is shown as `badge: null` here rather than an
/// error; the profile page must render either way.
pub async fn get_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, badge_id, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let xp = total_xp(&pool, user_id).await?;
    let level = level_info(xp);
    let badge = badge_for_level(&pool, level.level).await?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        created_at: user.created_at,
        total_xp: xp,
        level,
        badge,
    }))
}

/// Current user's level snapshot plus UI styling.
pub async fn get_my_level(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let xp = total_xp(&pool, claims.user_id()).await?;
    let level = level_info(xp);
    let style = level_style(level.level);

    Ok(Json(serde_json::json!({
        "total_xp": xp,
        "level": level,
        "style": style
    })))
}

/// All badges the current user has unlocked so far, lowest tier first.
pub async fn get_my_badges(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let xp = total_xp(&pool, claims.user_id()).await?;
    let level = level_info(xp);
    let badges = unlocked_badges(&pool, level.level).await?;

    Ok(Json(badges))
}

/// Lists the current user's per-material quiz progress.
pub async fn list_my_progress(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let progress = sqlx::query_as::<_, QuizProgress>(
        r#"
        SELECT user_id, material_id, questions_answered, correct_answers, xp_earned, is_completed, updated_at
        FROM quiz_progress
        WHERE user_id = $1
        ORDER BY material_id ASC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(progress))
}
