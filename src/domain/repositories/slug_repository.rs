//! Repository trait for slug storage.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage collaborator consulted by the slug allocator.
///
/// `exists_slug` is the single source of truth for whether a slug is taken;
/// it must reflect committed rows at call time. The uniqueness constraint
/// enforced by `create` is the final authority when two writers race.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSlugRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::InMemorySlugRepository`] - process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlugRepository: Send + Sync {
    /// Returns whether a row with this slug exists.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the storage cannot be queried.
    /// Implementations must never report a failed check as "not found".
    async fn exists_slug(&self, slug: &str) -> Result<bool, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SlugConflict`] if the slug was taken between the
    /// allocator's check and this write.
    ///
    /// Returns [`AppError::Unavailable`] on storage errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Looks up a link and records one visit in the same step.
    ///
    /// Returns the link with its updated `visit_count`, or `None` if no link
    /// has this slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] on storage errors.
    async fn find_and_count_visit(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Checks that the storage backend is reachable.
    async fn health_check(&self) -> bool;
}
