//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AccessError ───┐                                                       │
//! │  CoreError   ───┼──► ApiError { code, message } ──► HTTP status + JSON  │
//! │  DbError     ───┘                                                       │
//! │                                                                         │
//! │  UNAUTHENTICATED 401   FORBIDDEN 403      NOT_FOUND 404                 │
//! │  INVALID_INPUT   400   INSUFFICIENT_STOCK 409   INTERNAL_ERROR 500      │
//! │                                                                         │
//! │  Internal errors are logged with detail; the client only sees a        │
//! │  generic message.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pharmos_core::{AccessError, CoreError, ValidationError};
use pharmos_db::DbError;
use serde::Serialize;
use ts_rs::TS;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for item 3f2c…: available 2, requested 3"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, malformed or expired credential (401)
    Unauthenticated,

    /// Role lacks the capability (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    InvalidInput,

    /// Not enough stock for a sale line (409)
    InsufficientStock,

    /// Storage or infrastructure failure (500)
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    /// Logs `detail` and returns an internal error with a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Internal error");
        ApiError::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Converts access gate failures.
impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated(reason) => {
                tracing::debug!(%reason, "Unauthenticated request");
                ApiError::new(ErrorCode::Unauthenticated, "Unauthenticated")
            }
            AccessError::Forbidden => ApiError::new(ErrorCode::Forbidden, "Forbidden"),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ItemNotFound(id) => ApiError::not_found("Item", &id),
            CoreError::SaleNotFound(id) => ApiError::not_found("Sale", &id),
            CoreError::UserNotFound(id) => ApiError::not_found("User", &id),
            err @ CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => {
                ApiError::invalid_input(format!("{} already exists", field))
            }
            DbError::CheckViolation(detail) => {
                tracing::warn!(%detail, "Constraint rejected a write");
                ApiError::invalid_input("A value is out of its allowed range")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::invalid_input("Invalid reference")
            }
            other => ApiError::internal(other),
        }
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
