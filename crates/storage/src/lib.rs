//! Slot storage abstraction and backends for cfipd.
//!
//! This crate provides:
//! - A flat object store trait with atomic writes
//! - A local filesystem backend with path traversal protection
//! - The single-slot store that keeps at most one canonical upload

pub mod backends;
pub mod error;
pub mod slot;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use slot::{ClearReport, SlotStore, SweepReport};
pub use traits::{ObjectMeta, ObjectStore};

use cfipd_core::config::StorageConfig;
use std::sync::Arc;

/// Create the slot store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<SlotStore> {
    let backend: Arc<dyn ObjectStore> = Arc::new(FilesystemBackend::new(&config.path).await?);
    Ok(SlotStore::new(backend, config.list_cache_ttl()))
}
