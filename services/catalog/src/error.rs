//! Custom error types for the catalog service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{
    error::{DatabaseError, ErrorBody},
    session::SessionError,
    validation::ValidationErrors,
};
use thiserror::Error;
use tracing::error;

/// Failures surfaced by catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No movie matches the given id or slug
    #[error("Movie not found: {0}")]
    NotFound(String),

    /// The slug is already taken by another record, active or not
    #[error("Slug already in use: {slug}")]
    DuplicateSlug { slug: String },

    /// Field constraints violated
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// No live session
    #[error("Unauthorized")]
    Unauthorized,

    /// The actor may not perform this operation
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl CatalogError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        CatalogError::ValidationFailed(ValidationErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::DuplicateSlug { .. } => StatusCode::CONFLICT,
            CatalogError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
            CatalogError::Forbidden => StatusCode::FORBIDDEN,
            CatalogError::Database(_) | CatalogError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        CatalogError::ValidationFailed(errors)
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            CatalogError::ValidationFailed(errors) => {
                ErrorBody::new(status.as_u16(), "Invalid request data")
                    .with_errors(errors.into_fields())
            }
            CatalogError::Database(ref e) => {
                error!("Database error: {}", e);
                ErrorBody::new(status.as_u16(), "Internal server error")
            }
            CatalogError::Session(ref e) => {
                error!("Session error: {}", e);
                ErrorBody::new(status.as_u16(), "Internal server error")
            }
            other => ErrorBody::new(status.as_u16(), other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for catalog results
pub type CatalogResult<T> = Result<T, CatalogError>;
