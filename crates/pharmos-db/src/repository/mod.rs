//! # Repository Module
//!
//! Database repository implementations for Pharmos.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.sales().create_sale(&lines, &subject.id)             │
//! │       ▼                                                                 │
//! │  SaleRepository ──uses──► item::decrement_stock_in (same transaction)  │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ItemRepository`](item::ItemRepository) - Item catalog and atomic stock decrement
//! - [`SaleRepository`](sale::SaleRepository) - Sale transaction and sale reads
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials

pub mod item;
pub mod sale;
pub mod user;
