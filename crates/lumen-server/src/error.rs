//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lumen_core::CoreError;
use lumen_scanner::ScanError;
use thiserror::Error;

/// Error returned by handlers, rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input was rejected before any browser work
    #[error("{0}")]
    BadRequest(String),

    /// Anything that went wrong while scanning
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => Self::BadRequest(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let err: ApiError = CoreError::Validation("URL is required".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "URL is required");
    }

    #[test]
    fn test_scan_failure_is_internal() {
        let err: ApiError = ScanError::Audit("axe is not defined".to_string())
            .for_url("https://a.example")
            .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("https://a.example"));
    }
}
