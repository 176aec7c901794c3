// src/handlers/badge.rs

use axum::{Json, extract::Path, extract::State, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    config::{MAX_LEVEL, XP_PER_LEVEL},
    error::AppError,
    leveling::{level_for_xp, level_style},
    models::badge::Badge,
};

/// Sums `xp_earned` across all of the user's materials.
/// Missing rows count as zero; the result feeds the level computation.
pub async fn total_xp(pool: &PgPool, user_id: i64) -> Result<i64, AppError> {
    let (xp,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(xp_earned), 0)::BIGINT FROM quiz_progress WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(xp)
}

/// Finds the single catalog row whose [level_min, level_max] range
/// contains the given level. `None` means a catalog gap; read paths show
/// it as "no badge" rather than failing.
pub async fn badge_for_level(pool: &PgPool, level: i64) -> Result<Option<Badge>, AppError> {
    let badge = sqlx::query_as::<_, Badge>(
        r#"
        SELECT id, nama, gambar, level_min, level_max
        FROM badges
        WHERE level_min <= $1 AND level_max >= $1
        "#,
    )
    .bind(level)
    .fetch_optional(pool)
    .await?;

    Ok(badge.map(Badge::with_fixed_image))
}

/// All badges the user has ever qualified for, lowest tier first.
/// Used for the collection gallery, as opposed to the single current badge.
pub async fn unlocked_badges(pool: &PgPool, level: i64) -> Result<Vec<Badge>, AppError> {
    let badges = sqlx::query_as::<_, Badge>(
        r#"
        SELECT id, nama, gambar, level_min, level_max
        FROM badges
        WHERE level_min <= $1
        ORDER BY level_min ASC
        "#,
    )
    .bind(level)
    .fetch_all(pool)
    .await?;

    Ok(badges.into_iter().map(Badge::with_fixed_image).collect())
}

/// Recomputes total XP -> level -> badge and persists the resolved badge
/// id onto the user row. Idempotent: with unchanged XP a second call
/// writes the same value. A catalog gap here is a hard NotFound, since
/// the caller asked to materialize the badge.
pub async fn update_user_badge(pool: &PgPool, user_id: i64) -> Result<Badge, AppError> {
    let xp = total_xp(pool, user_id).await?;
    let level = level_for_xp(xp);

    let badge = badge_for_level(pool, level)
        .await?
        .ok_or(AppError::NotFound(format!("No badge found for level {}", level)))?;

    sqlx::query("UPDATE users SET badge_id = $1 WHERE id = $2")
        .bind(badge.id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist badge for user {}: {:?}", user_id, e);
            AppError::from(e)
        })?;

    Ok(badge)
}

/// Lists the full badge catalog.
pub async fn list_badges(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let badges = sqlx::query_as::<_, Badge>(
        "SELECT id, nama, gambar, level_min, level_max FROM badges ORDER BY level_min ASC",
    )
    .fetch_all(&pool)
    .await?;

    let badges: Vec<Badge> = badges.into_iter().map(Badge::with_fixed_image).collect();

    Ok(Json(badges))
}

/// Retrieves a single badge by ID.
pub async fn get_badge(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let badge = sqlx::query_as::<_, Badge>(
        "SELECT id, nama, gambar, level_min, level_max FROM badges WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Badge not found".to_string()))?;

    Ok(Json(badge.with_fixed_image()))
}

/// Lists the level ladder: number, XP band, and UI style per level.
/// Static configuration; no database involved.
pub async fn list_levels() -> impl IntoResponse {
    let levels: Vec<serde_json::Value> = (1..=MAX_LEVEL)
        .map(|level| {
            let style = level_style(level);
            serde_json::json!({
                "level": level,
                "name": style.name,
                "color": style.color,
                "icon": style.icon,
                "xp_min": (level - 1) * XP_PER_LEVEL,
                "xp_max": if level == MAX_LEVEL {
                    serde_json::Value::Null
                } else {
                    serde_json::Value::from(level * XP_PER_LEVEL - 1)
                },
            })
        })
        .collect();

    Json(levels)
}
