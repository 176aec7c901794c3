// src/models/material.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::validate_image_ref;

/// Represents the 'materials' table: a learning-content unit under a
/// topic. Quiz progress and XP are tracked per material.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub topic_id: i64,
    pub title: String,

    /// Rendered HTML body. Sanitized at write time.
    pub content: String,

    /// Cover image reference (absolute URL or site-relative path).
    pub cover_img: String,

    /// Number of content pages; each page carries one quiz question.
    pub page_count: i32,

    pub comments_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new material.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaterialRequest {
    pub topic_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50000))]
    pub content: String,
    #[validate(length(max = 500), custom(function = validate_image_ref))]
    pub cover_img: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub page_count: Option<i32>,
}

/// Query parameters for listing materials.
#[derive(Debug, Deserialize)]
pub struct MaterialListParams {
    pub topic_id: Option<i64>,
    pub q: Option<String>,
}
