//! # pharmos-db: Database Layer for Pharmos
//!
//! This crate provides database access for Pharmos.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pharmos Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    pharmos-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ItemRepo      │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ _schema.sql  │  │   │
//! │  │   │               │    │ UserRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharmos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./pharmos.db")).await?;
//!
//! let sale = db.sales().create_sale(&lines, &subject.id).await?;
//! let item = db.items().get(&item_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::item::{ItemRepository, StockDecrement};
pub use repository::sale::SaleRepository;
pub use repository::user::{UserRecord, UserRepository};
