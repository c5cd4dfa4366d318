//! Application layer services.
//!
//! - [`services::admission_controller::AdmissionController`] - Per-route fixed-window limiter
//! - [`services::slug_allocator::SlugAllocator`] - Slug collision resolution
//! - [`services::link_service::LinkService`] - Link creation on top of the allocator

pub mod services;
