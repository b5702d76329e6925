//! # HTTP Errors
//!
//! The one error shape every handler returns.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in AgriRent                               │
//! │                                                                         │
//! │  Handler → Service                                                      │
//! │         │                                                               │
//! │         ├── ValidationError ──┐                                         │
//! │         ├── CoreError ────────┼──► ApiError ──► (StatusCode, JSON)     │
//! │         └── DbError ──────────┘                                         │
//! │                                                                         │
//! │  Status mapping                                                         │
//! │  ─────────────                                                          │
//! │  VALIDATION_ERROR                            400                        │
//! │  UNAUTHENTICATED                             401                        │
//! │  PERMISSION_DENIED                           403                        │
//! │  NOT_FOUND                                   404                        │
//! │  DUPLICATE / CONFLICT / INVALID_TRANSITION   409                        │
//! │  PAYLOAD_TOO_LARGE                           413                        │
//! │  INTERNAL                                    500 (detail logged only)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Response Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "mobile_number: must be exactly 10 digits",
//!   "field": "mobile_number"
//! }
//! ```

use agrirent_core::{CoreError, ValidationError};
use agrirent_db::DbError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Stable code clients branch on
    pub code: ErrorCode,

    /// Shown to the farmer as-is
    pub message: String,

    /// Offending form field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    /// Uniqueness violated (second registration, second review)
    Duplicate,
    /// Row changed under a guarded write
    Conflict,
    InvalidTransition,
    PayloadTooLarge,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Duplicate | ErrorCode::Conflict | ErrorCode::InvalidTransition => {
                StatusCode::CONFLICT
            }
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("No {} with id {}", resource, id))
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthenticated, message)
    }

    /// Creates an internal error. The detail is logged, never returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Result type for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            field: Some(err.field().to_string()),
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => v.into(),
            CoreError::PermissionDenied { .. } => {
                tracing::warn!(error = %err, "Action denied");
                ApiError::new(ErrorCode::PermissionDenied, err.to_string())
            }
            CoreError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Duplicate { .. } => ApiError::new(ErrorCode::Duplicate, err.to_string()),
            CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::InvalidTransition, err.to_string())
            }
            CoreError::Conflict { .. } => ApiError::new(ErrorCode::Conflict, err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} {} is already taken", field, value),
            ),
            DbError::Conflict { entity, id } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} {} was modified concurrently, reload and retry", entity, id),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!(%message, "Dangling reference on write");
                ApiError::new(ErrorCode::ValidationError, "Referenced record does not exist")
            }
            other => ApiError::internal(other),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(ErrorCode::PayloadTooLarge, "Upload is too large")
        } else {
            ApiError::new(ErrorCode::ValidationError, err.body_text())
        }
    }
}
