//! Random slug generation and custom slug validation.

use crate::error::AppError;
use serde_json::json;

/// Random bytes per generated slug; hex encoding doubles the length.
const SLUG_LENGTH_BYTES: usize = 4;

pub const MIN_CUSTOM_SLUG_LEN: usize = 3;
pub const MAX_CUSTOM_SLUG_LEN: usize = 20;

/// Slugs that would shadow service routes.
const RESERVED_SLUGS: &[&str] = &["api", "auth", "health", "urls"];

/// Generates an 8-character lowercase hex slug from OS randomness.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
pub fn generate_slug() -> String {
    let mut buffer = [0u8; SLUG_LENGTH_BYTES];

    getrandom::fill(&mut buffer).expect("Failed to generate random bytes");

    hex::encode(buffer)
}

/// Validates a caller-supplied slug.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Not a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    let len = slug.chars().count();
    if !(MIN_CUSTOM_SLUG_LEN..=MAX_CUSTOM_SLUG_LEN).contains(&len) {
        return Err(AppError::bad_request(
            "Slug must be between 3 and 20 characters",
            json!({ "provided_length": len }),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::bad_request(
            "Slug can only contain letters, digits, hyphens and underscores",
            json!({ "slug": slug }),
        ));
    }

    if RESERVED_SLUGS.contains(&slug.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This slug is reserved",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}
