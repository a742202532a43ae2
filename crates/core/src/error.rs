//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no file selected")]
    NoFileSelected,

    #[error("unsupported file type: {0} (only csv or txt files are accepted)")]
    UnsupportedType(String),

    #[error("username and password are required")]
    EmptyCredentials,

    #[error("invalid api key: {0}")]
    InvalidApiKey(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
