//! Slug storage implementations.
//!
//! - [`PgSlugRepository`] - PostgreSQL via SQLx, used when `DATABASE_URL` is set
//! - [`InMemorySlugRepository`] - process-local fallback, also used by tests

pub mod memory_slug_repository;
pub mod pg_slug_repository;

pub use memory_slug_repository::InMemorySlugRepository;
pub use pg_slug_repository::PgSlugRepository;
