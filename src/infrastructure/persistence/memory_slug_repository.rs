//! Process-local slug storage.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::SlugRepository;
use crate::error::AppError;

#[derive(Default)]
struct Store {
    links: HashMap<String, Link>,
    next_id: i64,
}

/// In-memory repository used when no database is configured, and in tests.
///
/// Enforces slug uniqueness on insert the same way the database constraint
/// does, so write-time conflicts behave identically.
#[derive(Default)]
pub struct InMemorySlugRepository {
    store: Mutex<Store>,
}

impl InMemorySlugRepository {
    pub fn new() -> Self {
        tracing::debug!("Using in-memory slug storage");
        Self::default()
    }

    /// Creates a repository pre-populated with the given slugs.
    pub fn with_slugs<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let repo = Self::default();
        {
            let mut store = repo.lock();
            for slug in slugs {
                let slug = slug.into();
                let link = store.insert(slug.clone(), format!("https://example.com/{slug}"));
                store.links.insert(slug, link);
            }
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.lock().links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the stored link, without counting a visit.
    pub fn get(&self, slug: &str) -> Option<Link> {
        self.lock().links.get(slug).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store {
    fn insert(&mut self, slug: String, original_url: String) -> Link {
        self.next_id += 1;
        Link::new(self.next_id, slug, original_url, 0, Utc::now())
    }
}

#[async_trait]
impl SlugRepository for InMemorySlugRepository {
    async fn exists_slug(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.lock().links.contains_key(slug))
    }

    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut store = self.lock();

        if store.links.contains_key(&new_link.slug) {
            return Err(AppError::slug_conflict(new_link.slug));
        }

        let link = store.insert(new_link.slug.clone(), new_link.original_url);
        store.links.insert(new_link.slug, link.clone());
        Ok(link)
    }

    async fn find_and_count_visit(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let mut store = self.lock();
        Ok(store.links.get_mut(slug).map(|link| {
            link.visit_count += 1;
            link.clone()
        }))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
