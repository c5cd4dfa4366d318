//! Handler for the link creation endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/urls`, guarded by the `link-create` admission policy.
///
/// # Request Body
///
/// ```json
/// { "original_url": "https://example.com", "slug": "promo" }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "slug": "promo-1",
///   "original_url": "https://example.com",
///   "short_url": "https://s.example.com/promo-1",
///   "visit_count": 0,
///   "requested_slug": "promo",
///   "slug_origin": "derived"
/// }
/// ```
///
/// # Errors
///
/// - `400` invalid URL or slug
/// - `409` slug taken at write time, or no free suffixed alternative
/// - `429` admission denied (from the route guard)
/// - `503` storage unavailable
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let requested = payload.slug.clone();
    let created = state
        .link_service
        .create_link(payload.original_url, payload.slug)
        .await?;

    let link = created.link;
    let short_url = state.link_service.get_short_url(&link.slug);
    let requested_slug = requested.filter(|r| *r != link.slug);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            slug: link.slug,
            original_url: link.original_url,
            short_url,
            visit_count: link.visit_count,
            requested_slug,
            slug_origin: created.slug.origin,
        }),
    ))
}
