//! PostgreSQL implementation of slug storage.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::SlugRepository;
use crate::error::AppError;

/// PostgreSQL repository backed by the `links` table.
///
/// The `links.slug` unique constraint is the final arbiter when two writers
/// race for the same slug.
pub struct PgSlugRepository {
    pool: Arc<PgPool>,
}

impl PgSlugRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlugRepository for PgSlugRepository {
    async fn exists_slug(&self, slug: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM links WHERE slug = $1)")
            .bind(slug)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let result = sqlx::query_as::<_, Link>(
            r#"
            INSERT INTO links (slug, original_url)
            VALUES ($1, $2)
            RETURNING id, slug, original_url, visit_count, created_at
            "#,
        )
        .bind(&new_link.slug)
        .bind(&new_link.original_url)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(link) => Ok(link),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                tracing::info!(slug = %new_link.slug, "Slug taken at write time");
                Err(AppError::slug_conflict(new_link.slug))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_and_count_visit(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let link = sqlx::query_as::<_, Link>(
            r#"
            UPDATE links
            SET visit_count = visit_count + 1
            WHERE slug = $1
            RETURNING id, slug, original_url, visit_count, created_at
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
