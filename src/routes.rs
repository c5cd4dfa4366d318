//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`    - Storage and admission status (unguarded)
//! - `POST /api/urls`  - Link creation (admission-guarded)
//! - `GET  /{slug}`    - Redirect and visit count (unguarded)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Admission** - Per-client, per-route fixed windows (see [`crate::api::middleware::rate_limit`])
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app_routes(state))
}

/// Routes and per-route middleware, before path normalization.
pub fn app_routes(state: AppState) -> Router {
    let api_router = api::routes::guarded_routes(&state);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .route("/{slug}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer())
}
