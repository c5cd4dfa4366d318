//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.

pub mod slug_repository;

pub use slug_repository::SlugRepository;

#[cfg(test)]
pub use slug_repository::MockSlugRepository;
