//! HTTP server for the cfipd single-slot upload service.
//!
//! This crate provides the HTTP surface:
//! - Session login and first-user registration pages
//! - Upload, clear, fetch and list endpoints for the single slot
//! - API key issuance and the session-or-key access gate
//! - Periodic expiry of stale uploads and session pruning

pub mod auth;
pub mod cleanup;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use auth::TraceId;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
