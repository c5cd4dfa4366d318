//! Business logic services for the application layer.

pub mod admission_controller;
pub mod link_service;
pub mod slug_allocator;

pub use admission_controller::{AdmissionController, Decision};
pub use link_service::{CreatedLink, LinkService};
pub use slug_allocator::SlugAllocator;
