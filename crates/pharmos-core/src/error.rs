//! # Error Types
//!
//! Domain-specific error types for pharmos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharmos-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── AccessError      - Unauthenticated / Forbidden                    │
//! │                                                                         │
//! │  pharmos-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Not enough stock to complete a sale line.
    ///
    /// ## User Workflow
    /// ```text
    /// POS: Paracetamol 500mg × 5
    ///      │
    ///      ▼
    /// Conditional decrement: stock=3, requested=5 → no row updated
    ///      │
    ///      ▼
    /// InsufficientStock { item_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, UI shows "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for item {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// User account not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate barcode or email).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The operation conflicts with a business rule.
    #[error("{0}")]
    Rule(String),
}

// =============================================================================
// Access Error
// =============================================================================

/// Authorization failures produced by the access gate.
///
/// Neither variant says which capability was missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Missing, malformed or expired credential.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid credential whose role lacks the required capability.
    #[error("Forbidden")]
    Forbidden,
}

// =============================================================================
// Unit Tests
// =============================================================================
