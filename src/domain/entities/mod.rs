//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`RateWindow`] - Counting window for one `(client, route)` pair
//! - [`RouteLimitPolicy`] / [`RoutePolicies`] - Static admission policy table
//! - [`SlugCandidate`] - Deterministic `base`, `base-1`, ... sequence
//! - [`FinalizedSlug`] - Allocator output, tagged with its [`SlugOrigin`]
//! - [`Link`] / [`NewLink`] - Stored slug-to-URL mapping

pub mod link;
pub mod rate_window;
pub mod route_policy;
pub mod slug;

pub use link::{Link, NewLink};
pub use rate_window::RateWindow;
pub use route_policy::{ParsePolicyError, RouteLimitPolicy, RoutePolicies};
pub use slug::{FinalizedSlug, SlugAvailability, SlugCandidate, SlugOrigin};
