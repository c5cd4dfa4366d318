//! Domain layer containing entities and storage contracts.
//!
//! - [`entities`] - Rate windows, route policies, slug candidates and links
//! - [`repositories`] - Storage trait consumed by the slug allocator
//!
//! The domain layer has no dependency on the HTTP or infrastructure layers.
//! Decision logic lives in [`crate::application::services`].

pub mod entities;
pub mod repositories;
