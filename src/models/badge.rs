// src/models/badge.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::models::validate_image_ref;

/// Represents the 'badges' catalog table.
///
/// Column names (`nama`, `gambar`) come from the original catalog import
/// and are kept as the external contract. Ranges are inclusive and
/// non-overlapping; every level 1..=8 belongs to exactly one row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Badge {
    pub id: i64,
    pub nama: String,
    pub gambar: String,
    pub level_min: i64,
    pub level_max: i64,
}

impl Badge {
    /// Applies the legacy image-extension fix.
    ///
    /// Old catalog rows still reference `.jpg` files that were converted
    /// to `.png` after import. Every read path that returns a badge must
    /// pass through here.
    pub fn with_fixed_image(mut self) -> Self {
        self.gambar = fix_image_ext(&self.gambar);
        self
    }
}

/// Rewrites a trailing `.jpg` to `.png`; anything else passes through.
pub fn fix_image_ext(image: &str) -> String {
    match image.strip_suffix(".jpg") {
        Some(stem) => format!("{}.png", stem),
        None => image.to_string(),
    }
}

/// DTO for creating or replacing a badge catalog row.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBadgeRequest {
    #[validate(length(min = 1, max = 100))]
    pub nama: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_image_ref))]
    pub gambar: String,
    #[validate(range(min = 1, max = 8))]
    pub level_min: i64,
    #[validate(range(min = 1, max = 8))]
    pub level_max: i64,
}
