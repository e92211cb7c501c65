//! Custom error types for the account service

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use common::{
    error::{DatabaseError, ErrorBody},
    session::SessionError,
    validation::ValidationErrors,
};
use thiserror::Error;
use tracing::error;

/// Failures surfaced by account operations
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// Username or email already taken
    #[error("{field} already in use: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Too many failed login attempts, retry in {retry_after_secs} seconds")]
    TooManyAttempts { retry_after_secs: u64 },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Account not found: {0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AuthError::ValidationFailed(ValidationErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::Duplicate { .. } => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::TooManyAttempts { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::PasswordHash(_) | AuthError::Database(_) | AuthError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        AuthError::ValidationFailed(errors)
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            AuthError::TooManyAttempts { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let body = match self {
            AuthError::ValidationFailed(errors) => {
                ErrorBody::new(status.as_u16(), "Invalid request data")
                    .with_errors(errors.into_fields())
            }
            internal @ (AuthError::PasswordHash(_)
            | AuthError::Database(_)
            | AuthError::Session(_)) => {
                error!("Internal error: {}", internal);
                ErrorBody::new(status.as_u16(), "Internal server error")
            }
            other => ErrorBody::new(status.as_u16(), other.to_string()),
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Type alias for account results
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountDisabled.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Duplicate {
                field: "email",
                value: "a@b.co".to_string()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::TooManyAttempts {
                retry_after_secs: 10
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_throttled_response_carries_retry_after() {
        let response = AuthError::TooManyAttempts {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "42");
    }

    #[test]
    fn test_duplicate_names_field_and_value() {
        let err = AuthError::Duplicate {
            field: "username",
            value: "thanh".to_string(),
        };
        assert_eq!(err.to_string(), "username already in use: thanh");
    }
}
