//! # pharmos-api: HTTP Server for the Pharmos Back Office
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► TracingLogger span ──► routes ──► handler                  │
//! │                                                │                        │
//! │                                   Caller (gate) │ require(capability)   │
//! │                                                ▼                        │
//! │                                   pharmos-db repositories               │
//! │                                                │                        │
//! │                  ApiError { code, message } ◄──┘ on failure             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - Environment configuration
//! - [`auth`] - Bearer token issuing and decoding
//! - [`gate`] - Request authentication extractor
//! - [`handlers`] / [`routes`] - The HTTP interface
//! - [`error`] - Error responses

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::configure;
pub use state::AppState;
