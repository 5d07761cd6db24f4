// Error handling for the storage boundary and the catalog/cart HTTP surface
// Authentication failures have their own type in auth::error

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Errors surfaced by repository implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. email already taken)
    #[error("duplicate value for {0}")]
    Duplicate(String),

    /// The referenced document does not exist
    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error type for catalog and cart handlers
///
/// Messages carried by `NotFound`, `Validation` and `Storage` are chosen by the
/// handler and are safe to show to clients. The storage source is only logged.
#[derive(Debug)]
pub enum ApiError {
    /// Maps to HTTP 400
    Validation(String),

    /// Maps to HTTP 404
    NotFound(String),

    /// Maps to HTTP 500
    Storage {
        message: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    /// Wrap a storage failure with the generic message the client will see
    pub fn storage(message: &'static str, source: StoreError) -> Self {
        ApiError::Storage { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Validation(message) => {
                debug!("Validation error: {}", message);
                message
            }
            ApiError::NotFound(message) => {
                debug!("Not found: {}", message);
                message
            }
            ApiError::Storage { message, source } => {
                // Full detail stays server-side
                error!("Storage error: {:?}", source);
                message.to_string()
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(format!("Request validation failed: {}", errors))
    }
}
