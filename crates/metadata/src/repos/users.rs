//! User repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;

/// Repository for user operations.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Whether any user has registered.
    async fn has_users(&self) -> MetadataResult<bool>;

    /// Get a user by username.
    async fn get_user(&self, username: &str) -> MetadataResult<Option<UserRow>>;

    /// Create a user, but only while the store is empty.
    ///
    /// Fails with `AlreadyExists` once any user is present. The check and
    /// the write happen under the same lock.
    async fn create_first_user(&self, user: &UserRow) -> MetadataResult<()>;
}
