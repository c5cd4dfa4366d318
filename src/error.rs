//! Application error type and its HTTP mapping.
//!
//! Every fallible operation in the crate returns [`AppError`]. Handlers and
//! middleware return it directly; the [`IntoResponse`] impl turns it into a
//! JSON envelope:
//!
//! ```json
//! { "error": { "code": "rate_limited", "message": "...", "details": { ... } } }
//! ```

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Serialized form of an error, embedded in the response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// No link is stored under the slug.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The admission controller denied the request.
    #[error("Too many requests. Please try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    /// The slug collided with an existing row when it was written.
    #[error("Slug '{slug}' is already taken. Please choose a different one.")]
    SlugConflict { slug: String },

    /// Every suffixed candidate up to the probe limit is taken.
    #[error("No free slug derived from '{base}' after {probes} attempts")]
    SlugExhausted { base: String, probes: usize },

    /// The storage collaborator failed for infrastructure reasons.
    #[error("{message}")]
    Unavailable { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    pub fn slug_conflict(slug: impl Into<String>) -> Self {
        Self::SlugConflict { slug: slug.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::SlugConflict { .. } | AppError::SlugExhausted { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error code plus details, without the status.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, details) = match self {
            AppError::Validation { details, .. } => ("validation_error", details.clone()),
            AppError::NotFound { details, .. } => ("not_found", details.clone()),
            AppError::RateLimited { retry_after_secs } => (
                "rate_limited",
                json!({ "retry_after_secs": retry_after_secs }),
            ),
            AppError::SlugConflict { slug } => ("slug_conflict", json!({ "slug": slug })),
            AppError::SlugExhausted { base, probes } => (
                "slug_exhausted",
                json!({ "base": base, "probes": probes }),
            ),
            AppError::Unavailable { details, .. } => ("service_unavailable", details.clone()),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Storage error");
        AppError::unavailable("Storage unavailable", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let errors = e.field_errors();
        let fields: Vec<&str> = errors.keys().map(|k| k.as_ref()).collect();
        AppError::bad_request(
            "Request validation failed",
            json!({ "fields": fields, "reason": e.to_string() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_includes_wait() {
        let err = AppError::RateLimited {
            retry_after_secs: 42,
        };
        assert_eq!(
            err.to_string(),
            "Too many requests. Please try again in 42 seconds."
        );
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_rate_limited_response_has_retry_after_header() {
        let response = AppError::RateLimited {
            retry_after_secs: 17,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "17");
    }

    #[test]
    fn test_slug_conflict_is_distinct_from_validation() {
        let conflict = AppError::slug_conflict("abc").to_error_info();
        let invalid = AppError::bad_request("bad slug", json!({})).to_error_info();

        assert_eq!(conflict.code, "slug_conflict");
        assert_eq!(conflict.details["slug"], "abc");
        assert_ne!(conflict.code, invalid.code);
        assert!(conflict.message.contains("already taken"));
    }

    #[test]
    fn test_exhausted_maps_to_conflict_status() {
        let err = AppError::SlugExhausted {
            base: "foo".to_string(),
            probes: 100,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_error_info().code, "slug_exhausted");
    }

    #[test]
    fn test_validation_errors_list_fields() {
        use crate::api::dto::shorten::ShortenRequest;
        use validator::Validate;

        let request = ShortenRequest {
            original_url: "not a url".to_string(),
            slug: None,
        };
        let err: AppError = request.validate().unwrap_err().into();
        let info = err.to_error_info();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(info.code, "validation_error");
        assert_eq!(info.details["fields"], json!(["original_url"]));
    }

    #[test]
    fn test_not_found_envelope() {
        let info = AppError::not_found("Short link not found", json!({ "slug": "gone" }))
            .to_error_info();

        assert_eq!(info.code, "not_found");
        assert_eq!(info.details["slug"], "gone");
    }

    #[test]
    fn test_unavailable_status() {
        let err = AppError::unavailable("Storage unavailable", json!({}));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
