//! Handler for short link redirects.

use axum::{
    extract::{Path, State},
    response::Redirect,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its original URL and counts the visit.
///
/// # Endpoint
///
/// `GET /{slug}`, not admission-guarded.
///
/// # Errors
///
/// - `404` no link has this slug
/// - `503` storage unavailable
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let link = state.link_service.visit(&slug).await?;

    metrics::counter!("link_visits_total").increment(1);
    tracing::debug!(slug = %link.slug, visits = link.visit_count, "Redirecting");

    Ok(Redirect::temporary(&link.original_url))
}
