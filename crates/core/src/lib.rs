//! Core domain types and shared logic for the cfipd upload service.
//!
//! This crate defines the data model used across all other crates:
//! - Accepted file kinds and the canonical slot filename
//! - Upload results for the single-slot store
//! - API keys and session secrets
//! - Login credentials
//! - Application configuration

pub mod config;
pub mod credentials;
pub mod error;
pub mod token;
pub mod upload;

pub use credentials::Credentials;
pub use error::{Error, Result};
pub use token::{ApiKey, generate_secret};
pub use upload::{FileKind, StoredFile};

/// Maximum accepted request body: 16 MiB
pub const MAX_UPLOAD_SIZE: u64 = 16 * 1024 * 1024;

/// Age after which the expiry sweep removes a stored file: 24 hours
pub const DEFAULT_FILE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Header carrying an API key on machine uploads.
pub const API_KEY_HEADER: &str = "x-api-key";
