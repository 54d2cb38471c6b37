//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == API Error Enum ==
/// Unified error type for the gateway.
///
/// Variants carry plain messages so that an error can be cloned and handed to
/// every caller waiting on the same in-flight fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid request data (missing or malformed parameters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested entity does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream HTTP, network or decoding failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Key-value store connection failure
    #[error("Cache store error: {0}")]
    Store(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status this error maps to at the route boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Store(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("serialization failed: {}", err))
    }
}

// == Store Error Enum ==
/// Failures raised by a key-value store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend connection has been closed
    #[error("store connection is closed")]
    Closed,

    /// Key rejected by the store's limits
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// Redis command or connection failure
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err.to_string())
    }
}

// == Result Type Aliases ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Result type for key-value store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Upstream("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Store("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_converts_to_store_variant() {
        let err: ApiError = StoreError::Closed.into();
        assert!(matches!(err, ApiError::Store(msg) if msg.contains("closed")));
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = ApiError::NotFound("broker".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Not found: broker");
    }
}
