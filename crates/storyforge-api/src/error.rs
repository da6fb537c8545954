//! StoryForge — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storyforge_core::error::DomainError;
use thiserror::Error;

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A domain error from a context crate.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A framework id that is not in the catalog.
    #[error("framework not found: {0}")]
    FrameworkNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::Domain(DomainError::NotFound(_)) | Self::FrameworkNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            Self::Domain(DomainError::Validation(_)) => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Domain(DomainError::Provider(_)) => (StatusCode::BAD_GATEWAY, "provider_error"),
            Self::Domain(DomainError::Persistence(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "persistence_error")
            }
        };

        let body = ErrorBody {
            error: error_code,
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        assert_eq!(
            status_of(ApiError::Domain(DomainError::NotFound(Uuid::new_v4()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::FrameworkNotFound("threeAct".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_maps_to_400() {
        assert_eq!(
            status_of(ApiError::Domain(DomainError::Validation("bad input".into()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_provider_maps_to_502() {
        assert_eq!(
            status_of(ApiError::Domain(DomainError::Provider("upstream".into()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_persistence_maps_to_500() {
        assert_eq!(
            status_of(ApiError::Domain(DomainError::Persistence("db down".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
