//! HTTP handlers, one module per resource.
//!
//! Guarded handlers take an [`Allowed`](crate::gate::Allowed) first, so the
//! capability is checked before the body is extracted.

pub mod auth;
pub mod health;
pub mod items;
pub mod sales;
pub mod users;
