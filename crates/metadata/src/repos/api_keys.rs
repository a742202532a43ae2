//! API key repository.

use crate::error::MetadataResult;
use crate::models::ApiKeyRow;
use async_trait::async_trait;
use cfipd_core::ApiKey;
use time::OffsetDateTime;

/// Repository for API key operations.
#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    /// Store a newly issued key.
    async fn create_api_key(&self, key: &ApiKey, row: &ApiKeyRow) -> MetadataResult<()>;

    /// Get a key record.
    async fn get_api_key(&self, key: &ApiKey) -> MetadataResult<Option<ApiKeyRow>>;

    /// Record a use of `key`. Returns false if the key was never issued.
    async fn touch_api_key(&self, key: &ApiKey, used_at: OffsetDateTime) -> MetadataResult<bool>;
}
