//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Domain Error (CoreError)            │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← categorized constraint failures, timeouts    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← status code + { code, message } body            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use pharmos_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (barcode, email).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation, e.g. a negative stock or price that got
    /// past validation.
    #[error("Constraint violated: {0}")]
    CheckViolation(String),

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A domain rule rejected the operation (insufficient stock, invalid input).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Runtime SQL error.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The operation did not finish within its time bound and was rolled back.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Whether this is a unique violation on `column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: items.barcode"
                //   "CHECK constraint failed: stock >= 0"
                //   "FOREIGN KEY constraint failed"
                if let Some(target) = msg.split("UNIQUE constraint failed: ").nth(1) {
                    // Drop the table prefix: "items.barcode" → "barcode"
                    let field = target
                        .rsplit('.')
                        .next()
                        .unwrap_or(target)
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg.to_string())
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<pharmos_core::ValidationError> for DbError {
    fn from(err: pharmos_core::ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
