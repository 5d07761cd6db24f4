// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use tracing::error;

use crate::error::{MessageResponse, StoreError};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    ValidationError(String),
    /// Unknown email or wrong password; the two are never distinguished
    InvalidCredentials,
    /// No token in body, query, `x-access-token` or `Authorization`
    MissingToken,
    InvalidToken,
    ExpiredToken,
    /// Token verified but its user no longer exists
    UnknownUser,
    EmailAlreadyExists,
    DatabaseError(String),
    PasswordHashError(String),
    TokenGenerationError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::UnknownUser => write!(f, "Token refers to a user that no longer exists"),
            AuthError::EmailAlreadyExists => write!(f, "Email already registered"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthError::EmailAlreadyExists,
            other => AuthError::DatabaseError(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(errors.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Client-caused rejections are logged where they are detected
        if self.is_internal() {
            error!("Auth failure: {}", self);
        }

        let body = Json(MessageResponse::new(self.error_message()));
        (self.status_code(), body).into_response()
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::FORBIDDEN,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::EmailAlreadyExists => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server-side faults, as opposed to rejections of the client's input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::DatabaseError(_) | AuthError::PasswordHashError(_) | AuthError::TokenGenerationError(_)
        )
    }

    /// Message safe to send to clients
    ///
    /// Every rejected token yields the same text whatever the reason.
    pub fn error_message(&self) -> String {
        match self {
            AuthError::ValidationError(msg) => msg.clone(),
            AuthError::InvalidCredentials => "Invalid email or password".to_string(),
            AuthError::MissingToken => "A token is required for authentication".to_string(),
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::UnknownUser => {
                "Invalid Token".to_string()
            }
            AuthError::EmailAlreadyExists => "Email already registered".to_string(),
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenGenerationError(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rejections_look_identical_to_clients() {
        let rejected = [AuthError::InvalidToken, AuthError::ExpiredToken, AuthError::UnknownUser];
        for err in &rejected {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.error_message(), "Invalid Token");
        }
    }

    #[test]
    fn test_missing_token_is_forbidden() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_store_error_maps_to_already_registered() {
        let err: AuthError = StoreError::Duplicate("users.email".into()).into();
        assert!(matches!(err, AuthError::EmailAlreadyExists));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_only_internal_errors_are_logged_when_rendered() {
        let rejections = [
            AuthError::MissingToken,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::UnknownUser,
            AuthError::InvalidCredentials,
            AuthError::EmailAlreadyExists,
        ];
        for err in &rejections {
            assert!(!err.is_internal(), "{:?} should be logged by its caller", err);
        }
        assert!(AuthError::DatabaseError("down".into()).is_internal());
        assert!(AuthError::TokenGenerationError("bad key".into()).is_internal());
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err = AuthError::DatabaseError("connection refused at 10.0.0.3".into());
        assert_eq!(err.error_message(), "Internal server error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
