// src/models/mod.rs

pub mod badge;
pub mod comment;
pub mod material;
pub mod progress;
pub mod question;
pub mod topic;
pub mod user;

use url::Url;

/// Validates an image reference: either an absolute http(s) URL or a
/// site-relative path starting with '/'.
pub(crate) fn validate_image_ref(image: &str) -> Result<(), validator::ValidationError> {
    if image.starts_with('/') {
        return Ok(());
    }
    match Url::parse(image) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_image_ref")),
    }
}
