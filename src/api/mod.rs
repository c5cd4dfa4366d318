//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Request/response serialization and validation
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Admission guard and tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
