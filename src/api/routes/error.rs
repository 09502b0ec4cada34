//! API error handling utilities.

use crate::services::{DefinitionError, SubmissionError};
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.message,
            "status": self.status.as_u16(),
        });

        (self.status, axum::Json(body)).into_response()
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::FormNotFound | SubmissionError::SubmissionNotFound => {
                Self::not_found(err.to_string())
            }
            SubmissionError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, message),
            SubmissionError::Validation(inner) => Self::bad_request(inner.to_string()),
            SubmissionError::Storage(inner) => inner.into(),
        }
    }
}

impl From<DefinitionError> for ApiError {
    fn from(err: DefinitionError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        // Store failures stay opaque to callers.
        error!(error = %err, "storage operation failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}
