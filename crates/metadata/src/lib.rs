//! Credential and API key stores for cfipd.
//!
//! This crate provides:
//! - Users with Argon2id password hashes and first-user-only registration
//! - API keys with last-use tracking
//! - A JSON-file store with per-file locking and atomic replacement

pub mod accounts;
pub mod error;
pub mod models;
pub mod password;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::{ApiKeyRow, UserRow};
pub use repos::{ApiKeyRepo, UserRepo};
pub use store::{JsonStore, MetadataStore};

use cfipd_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    let store = JsonStore::new(&config.users_path, &config.api_keys_path).await?;
    Ok(Arc::new(store) as Arc<dyn MetadataStore>)
}
