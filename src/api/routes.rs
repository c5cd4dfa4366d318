//! API route configuration.

use crate::api::handlers::shorten_handler;
use crate::api::middleware::RouteGuard;
use crate::domain::entities::route_policy::LINK_CREATE;
use crate::state::AppState;
use axum::{Router, routing::post};

/// API routes, each guarded by its named admission policy.
///
/// # Endpoints
///
/// - `POST /urls` - Create a short link (`link-create` policy)
pub fn guarded_routes(state: &AppState) -> Router<AppState> {
    RouteGuard::new(state.admission.clone(), LINK_CREATE)
        .apply(Router::new().route("/urls", post(shorten_handler)))
}
