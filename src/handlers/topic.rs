// src/handlers/topic.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        material::{Material, MaterialListParams},
        topic::Topic,
    },
};

/// Lists all topics.
pub async fn list_topics(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let topics = sqlx::query_as::<_, Topic>(
        "SELECT id, name, description, created_at FROM topics ORDER BY name ASC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(topics))
}

/// Retrieves a single topic by ID.
pub async fn get_topic(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let topic = sqlx::query_as::<_, Topic>(
        "SELECT id, name, description, created_at FROM topics WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    Ok(Json(topic))
}

/// Lists materials, optionally filtered by topic and search keyword.
pub async fn list_materials(
    State(pool): State<PgPool>,
    Query(params): Query<MaterialListParams>,
) -> Result<impl IntoResponse, AppError> {
    // Prepare search pattern
    let search_pattern = params.q.map(|k| format!("%{}%", k));

    // Unified query handling optional filters
    let materials = sqlx::query_as::<_, Material>(
        r#"
        SELECT id, topic_id, title, content, cover_img, page_count, comments_count, created_at
        FROM materials
        WHERE ($1::BIGINT IS NULL OR topic_id = $1)
          AND ($2::TEXT IS NULL OR title ILIKE $2)
        ORDER BY id ASC
        "#,
    )
    .bind(params.topic_id)
    .bind(search_pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(materials))
}

/// Retrieves a single material by ID.
pub async fn get_material(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let material = sqlx::query_as::<_, Material>(
        r#"
        SELECT id, topic_id, title, content, cover_img, page_count, comments_count, created_at
        FROM materials
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Material not found".to_string()))?;

    Ok(Json(material))
}
