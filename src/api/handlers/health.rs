//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: storage reachable
/// - **503 Service Unavailable**: storage check failed
///
/// The admission check only reports how many windows are held; it cannot fail.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = if state.link_service.storage_healthy().await {
        CheckStatus::ok("Storage reachable")
    } else {
        CheckStatus::error("Storage check failed")
    };

    let admission = CheckStatus::ok(format!(
        "Tracking {} rate windows",
        state.admission.tracked_windows()
    ));

    let healthy = storage.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { storage, admission },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
