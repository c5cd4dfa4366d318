//! Link entity representing a slug-to-URL mapping.

use chrono::{DateTime, Utc};

/// A stored short link.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub original_url: String,
    pub visit_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        slug: String,
        original_url: String,
        visit_count: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slug,
            original_url,
            visit_count,
            created_at,
        }
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub slug: String,
    pub original_url: String,
}
