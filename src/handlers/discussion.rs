// src/handlers/discussion.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::{CommentResponse, CreateCommentRequest},
    utils::jwt::Claims,
};

/// Create a new comment under a material.
pub async fn create_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(material_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user_id = claims.user_id();

    let mut tx = pool.begin().await?;

    // 1. Logic for root_id and parent_id
    let mut root_id: Option<i64> = None;
    if let Some(pid) = payload.parent_id {
        // Fetch parent to find its root
        let parent = sqlx::query_as::<_, (i64, Option<i64>)>(
            "SELECT id, root_id FROM comments WHERE id = $1 AND material_id = $2",
        )
        .bind(pid)
        .bind(material_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;

        // If parent has a root_id, then this new comment's root is that same root.
        // If parent's root_id is NULL, then the parent IS the root.
        root_id = Some(parent.1.unwrap_or(parent.0));
    }

    // 2. Insert Comment
    let (new_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO comments (material_id, user_id, content, root_id, parent_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(material_id)
    .bind(user_id)
    .bind(&payload.content)
    .bind(root_id)
    .bind(payload.parent_id)
    .fetch_one(&mut *tx)
    .await?;

    // 3. Update Material Count
    sqlx::query("UPDATE materials SET comments_count = comments_count + 1 WHERE id = $1")
        .bind(material_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": new_id })),
    ))
}

/// List all comments for a material, roots first, replies grouped under
/// their root in submission order.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Path(material_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comments = sqlx::query_as::<_, CommentResponse>(
        r#"
        SELECT
            c.id, c.material_id, c.user_id, u.username, c.content,
            c.root_id, c.parent_id, c.created_at, c.deleted_at
        FROM comments c
        JOIN users u ON c.user_id = u.id
        WHERE c.material_id = $1 AND c.deleted_at IS NULL
        ORDER BY c.root_id IS NOT NULL, c.root_id, c.created_at ASC
        "#,
    )
    .bind(material_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(comments))
}

/// Soft-delete a comment. Authors can delete their own; admins any.
pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((material_id, comment_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();

    let mut tx = pool.begin().await?;

    let owner = sqlx::query_as::<_, (i64,)>(
        "SELECT user_id FROM comments WHERE id = $1 AND material_id = $2 AND deleted_at IS NULL",
    )
    .bind(comment_id)
    .bind(material_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    if owner.0 != user_id && claims.role != "admin" {
        return Err(AppError::AuthError(
            "You can only delete your own comments.".to_string(),
        ));
    }

    sqlx::query("UPDATE comments SET deleted_at = NOW() WHERE id = $1")
        .bind(comment_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE materials SET comments_count = GREATEST(0, comments_count - 1) WHERE id = $1",
    )
    .bind(material_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
