//! Unified error handling for the API.
//!
//! Validation, not-found, and conflict errors are detected before any write
//! and reported directly to the caller. Upstream and internal errors that
//! occur mid-handler are surfaced without compensating rollback of
//! statements that already committed in earlier operations.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::clients::CollaboratorError;
use crate::db::RepositoryError;

/// A single per-field validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The request field that failed validation.
    pub field: &'static str,
    /// Human-readable message for the SPA to display.
    pub msg: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: &'static str, msg: impl Into<String>) -> Self {
        Self {
            field,
            msg: msg.into(),
        }
    }
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Outbound collaborator call failed (OCR, scraper, marketplace).
    #[error("Upstream error: {0}")]
    Upstream(#[from] CollaboratorError),

    /// Request body failed validation; carries per-field messages.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Uniqueness violation (username/email already taken).
    ///
    /// Reported as 400 rather than 409 - the SPA matches on the message
    /// body ("User already exists" etc.), a contract inherited from the
    /// previous backend.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_string()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Upstream(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Conflict(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        let body = match &self {
            Self::Validation(errors) => json!({ "errors": errors }),
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => json!({ "msg": "Server Error" }),
            Self::Upstream(_) => json!({ "msg": "External service error" }),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Conflict(msg)
            | Self::BadRequest(msg) => json!({ "msg": msg }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Item not found".to_string());
        assert_eq!(err.to_string(), "Not found: Item not found");

        let err = AppError::BadRequest("Search query is required".to_string());
        assert_eq!(err.to_string(), "Bad request: Search query is required");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_reports_bad_request() {
        // The SPA expects 400 + "User already exists" on duplicate signup
        assert_eq!(
            get_status(AppError::Conflict("User already exists".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_validation_reports_field_errors() {
        let err = AppError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("price", "Price must be a number"),
        ]);
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err: AppError = RepositoryError::NotFound.into();
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }
}
