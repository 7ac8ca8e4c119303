//! # pharmos-core: Pure Business Logic for Pharmos
//!
//! This crate holds the pharmacy back-office rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pharmos Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Back-office UI (browser)                        │   │
//! │  │    Items ──► POS ──► Billing ──► Users                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + bearer token                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (actix-web)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pharmos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  status   │  │  access   │  │   │
//! │  │   │   Item    │  │   Money   │  │ classify  │  │ Role→Caps │  │   │
//! │  │   │   Sale    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    pharmos-db (Database Layer)                  │   │
//! │  │        SQLite, migrations, repositories, sale transaction       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Sale, SaleLine, User)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`status`] - Stock/expiry status classification
//! - [`access`] - Roles, capabilities and the central capability table
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharmos_core::status::{classify, ItemStatus, StatusPolicy};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let expiry = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
//!
//! let status = classify(5, expiry, today, &StatusPolicy::default());
//! assert_eq!(status, ItemStatus::LowStock);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{Capability, Role, Subject};
pub use error::{AccessError, CoreError, ValidationError};
pub use money::Money;
pub use status::{ItemStatus, StatusPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which an item is reported as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum lines allowed in a single sale.
///
/// ## Business Reason
/// Keeps a single sale transaction (and the write lock it holds) short.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single item on one sale line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
