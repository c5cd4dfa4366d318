//! DTOs for the link creation endpoint.

use crate::domain::entities::SlugOrigin;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Compiled regex for custom slug validation.
static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request to create a short link.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// Destination URL (must be valid HTTP/HTTPS).
    #[serde(alias = "originalUrl")]
    #[validate(url(message = "Please provide a valid URL"))]
    pub original_url: String,

    /// Optional custom slug. A taken slug is replaced by a suffixed variant.
    #[validate(length(min = 3, max = 20, message = "Slug must be between 3 and 20 characters"))]
    #[validate(regex(path = "*SLUG_REGEX"))]
    pub slug: Option<String>,
}

/// Created link.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub slug: String,
    pub original_url: String,
    pub short_url: String,
    pub visit_count: i64,

    /// The slug the caller asked for, when it differs from `slug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_slug: Option<String>,

    pub slug_origin: SlugOrigin,
}
