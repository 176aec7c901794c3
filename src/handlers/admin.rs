// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        badge::CreateBadgeRequest,
        material::CreateMaterialRequest,
        question::CreateQuestionRequest,
        topic::CreateTopicRequest,
        user::User,
    },
    utils::{hash::hash_password, html::clean_html},
};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, badge_id, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    /// 'user', 'mentor' or 'admin'.
    pub role: String,
}

fn validate_role(role: &str) -> Result<(), AppError> {
    match role {
        "user" | "mentor" | "admin" => Ok(()),
        other => Err(AppError::BadRequest(format!("Unknown role '{}'", other))),
    }
}

/// Creates a new user with a specific role.
/// Admin only.
pub async fn create_user(
    State(pool): State<PgPool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_role(&payload.role)?;

    let hashed_password = hash_password(&payload.password)?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (username, password, role)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&payload.username)
    .bind(&hashed_password)
    .bind(&payload.role)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!(
                    "Username '{}' already exists",
                    payload.username
                ));
            }
        }
        tracing::error!("Failed to create user: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// DTO for changing a user's role.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: String,
}

/// Updates a user's role.
/// Admin only.
pub async fn update_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_role(&payload.role)?;

    let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
        .bind(&payload.role)
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Deletes a user.
/// Admin only.
pub async fn delete_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a new topic.
/// Admin only.
pub async fn create_topic(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO topics (name, description)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(&payload.name)
    .bind(payload.description.as_deref().unwrap_or(""))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("Topic '{}' already exists", payload.name));
            }
        }
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Creates a new material under a topic.
/// The HTML body is sanitized before it is stored.
/// Admin only.
pub async fn create_material(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateMaterialRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let topic = sqlx::query_as::<_, (i64,)>("SELECT id FROM topics WHERE id = $1")
        .bind(payload.topic_id)
        .fetch_optional(&pool)
        .await?;

    if topic.is_none() {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    let content = clean_html(&payload.content);

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO materials (topic_id, title, content, cover_img, page_count)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.topic_id)
    .bind(&payload.title)
    .bind(&content)
    .bind(payload.cover_img.as_deref().unwrap_or(""))
    .bind(payload.page_count.unwrap_or(3))
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Deletes a material (questions and ledgers cascade).
/// Admin only.
pub async fn delete_material(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Material not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a quiz question for one page of a material.
/// Admin only.
pub async fn create_question(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.answer_index as usize >= payload.options.len() {
        return Err(AppError::BadRequest(
            "answer_index must point at one of the options".to_string(),
        ));
    }

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO questions (material_id, page_number, content, options, answer_index)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(payload.material_id)
    .bind(payload.page_number)
    .bind(&payload.content)
    .bind(sqlx::types::Json(&payload.options))
    .bind(payload.answer_index)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(
                    "This material page already has a question".to_string(),
                );
            }
        }
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Deletes a question.
/// Admin only.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a badge catalog row.
/// Admin only. Range sanity (min <= max) is checked here; keeping the
/// whole ladder gap-free is the operator's responsibility.
pub async fn create_badge(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateBadgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.level_min > payload.level_max {
        return Err(AppError::BadRequest(
            "level_min cannot exceed level_max".to_string(),
        ));
    }

    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO badges (nama, gambar, level_min, level_max)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&payload.nama)
    .bind(&payload.gambar)
    .bind(payload.level_min)
    .bind(payload.level_max)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Replaces a badge catalog row.
/// Admin only.
pub async fn update_badge(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateBadgeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.level_min > payload.level_max {
        return Err(AppError::BadRequest(
            "level_min cannot exceed level_max".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE badges SET nama = $1, gambar = $2, level_min = $3, level_max = $4 WHERE id = $5",
    )
    .bind(&payload.nama)
    .bind(&payload.gambar)
    .bind(payload.level_min)
    .bind(payload.level_max)
    .bind(id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Badge not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "updated": true })))
}

/// Deletes a badge catalog row.
/// Admin only.
pub async fn delete_badge(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM badges WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Badge not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
