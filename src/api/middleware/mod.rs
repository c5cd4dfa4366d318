//! HTTP middleware for request processing and protection.

pub mod rate_limit;
pub mod tracing;

pub use rate_limit::RouteGuard;
