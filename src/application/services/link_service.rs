//! Link creation: validation, slug allocation, write.

use std::sync::Arc;

use serde_json::json;
use url::Url;

use crate::application::services::SlugAllocator;
use crate::domain::entities::{FinalizedSlug, Link, NewLink};
use crate::domain::repositories::SlugRepository;
use crate::error::AppError;
use crate::utils::slug_generator::{generate_slug, validate_custom_slug};

/// A freshly written link together with how its slug was chosen.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: Link,
    pub slug: FinalizedSlug,
}

/// Service for creating short links.
///
/// Runs the two-step protocol: the allocator decides a slug from storage
/// state, then the repository writes it. A conflict at write time is
/// returned to the caller, never retried here.
pub struct LinkService {
    repository: Arc<dyn SlugRepository>,
    allocator: SlugAllocator,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn SlugRepository>, max_probes: usize, base_url: String) -> Self {
        Self {
            allocator: SlugAllocator::with_max_probes(repository.clone(), max_probes),
            repository,
            base_url,
        }
    }

    pub fn allocator(&self) -> &SlugAllocator {
        &self.allocator
    }

    /// Creates a short link, using `desired_slug` when given.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not http(s) or the
    /// custom slug is invalid.
    ///
    /// Returns [`AppError::SlugConflict`] if the chosen slug was taken
    /// between allocation and write, and [`AppError::SlugExhausted`] if no
    /// suffixed alternative was free.
    pub async fn create_link(
        &self,
        original_url: String,
        desired_slug: Option<String>,
    ) -> Result<CreatedLink, AppError> {
        validate_destination(&original_url)?;

        if let Some(slug) = desired_slug.as_deref() {
            validate_custom_slug(slug)?;
        }

        let slug = self
            .allocator
            .allocate(desired_slug.as_deref(), generate_slug)
            .await?;

        let link = self
            .repository
            .create(NewLink {
                slug: slug.value.clone(),
                original_url,
            })
            .await?;

        tracing::info!(slug = %link.slug, origin = %slug.origin, "Link created");

        Ok(CreatedLink { link, slug })
    }

    /// Resolves a slug for redirection and counts the visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this slug.
    pub async fn visit(&self, slug: &str) -> Result<Link, AppError> {
        self.repository
            .find_and_count_visit(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "slug": slug })))
    }

    /// Builds the public short URL for a slug.
    pub fn get_short_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), slug)
    }

    pub async fn storage_healthy(&self) -> bool {
        self.repository.health_check().await
    }
}

fn validate_destination(original_url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(original_url).map_err(|e| {
        AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::bad_request(
            "Only http and https URLs can be shortened",
            json!({ "scheme": parsed.scheme() }),
        ));
    }

    if parsed.host_str().is_none() {
        return Err(AppError::bad_request(
            "URL must include a host",
            json!({ "url": original_url }),
        ));
    }

    Ok(())
}
