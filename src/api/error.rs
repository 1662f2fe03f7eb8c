//! API Error Types
//!
//! Defines error types for the JSON API and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::api::session::InteractionError;
use crate::record::RecordError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// An earlier load failed and no refresh happened since
    #[error("Record unavailable: refresh to retry")]
    RecordUnavailable,

    /// Store layer error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::UnsupportedPortion(_) => ApiError::Validation(err.to_string()),
            RecordError::VitaminNotFound { .. } => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<InteractionError> for ApiError {
    fn from(err: InteractionError) -> Self {
        match err {
            InteractionError::NotLoaded => ApiError::RecordUnavailable,
            InteractionError::Record(e) => e.into(),
            InteractionError::Load(e) | InteractionError::Save(e) => ApiError::Store(e),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::RecordUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "RECORD_UNAVAILABLE"),
            ApiError::Store(e) => match e {
                StoreError::NotConnected => (StatusCode::SERVICE_UNAVAILABLE, "STORE_NOT_CONNECTED"),
                StoreError::RecordNotFound(_) => (StatusCode::NOT_FOUND, "RECORD_NOT_FOUND"),
                StoreError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "STORE_TIMEOUT"),
                _ => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
