//! HTTP request handlers.

pub mod auth;
pub mod files;
pub mod health;
pub mod keys;

pub use auth::*;
pub use files::*;
pub use health::*;
pub use keys::*;

use serde::Serialize;

/// Bare `{"status": "success"}` body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}
