//! Registration, login and API key operations over a [`MetadataStore`].
//!
//! Argon2 is deliberately slow, so hashing and verification run on the
//! blocking pool.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{ApiKeyRow, UserRow};
use crate::password::{hash_password, verify_password};
use crate::store::MetadataStore;
use cfipd_core::{ApiKey, Credentials};
use time::OffsetDateTime;
use tracing::instrument;

async fn blocking<T, F>(f: F) -> MetadataResult<T>
where
    F: FnOnce() -> MetadataResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MetadataError::Internal(format!("spawn_blocking failed: {e}")))?
}

/// Register the first user.
///
/// Fails with `AlreadyExists` once anyone has registered.
#[instrument(skip(store), fields(username = %credentials.username))]
pub async fn register(
    store: &dyn MetadataStore,
    credentials: &Credentials,
) -> MetadataResult<UserRow> {
    // Cheap early exit; create_first_user repeats the check under its lock.
    if store.has_users().await? {
        return Err(MetadataError::AlreadyExists(
            "a user is already registered".to_string(),
        ));
    }

    let password = credentials.password.clone();
    let password_hash = blocking(move || hash_password(&password)).await?;
    let user = UserRow {
        username: credentials.username.clone(),
        password_hash,
        created_at: OffsetDateTime::now_utc(),
    };
    store.create_first_user(&user).await?;

    tracing::info!(username = %user.username, "Registered user");
    Ok(user)
}

/// Check a username/password pair. `Ok(None)` means the login is refused.
#[instrument(skip(store, password))]
pub async fn authenticate(
    store: &dyn MetadataStore,
    username: &str,
    password: &str,
) -> MetadataResult<Option<UserRow>> {
    let Some(user) = store.get_user(username.trim()).await? else {
        tracing::debug!("Unknown username");
        return Ok(None);
    };

    let password = password.to_string();
    let stored = user.password_hash.clone();
    let verified = blocking(move || verify_password(&password, &stored)).await?;
    Ok(verified.then_some(user))
}

/// Issue and persist a new API key.
#[instrument(skip(store))]
pub async fn issue_key(store: &dyn MetadataStore) -> MetadataResult<ApiKey> {
    let key = ApiKey::generate();
    store
        .create_api_key(&key, &ApiKeyRow::issued_at(OffsetDateTime::now_utc()))
        .await?;
    tracing::info!(key = %key.redacted(), "Issued API key");
    Ok(key)
}

/// Check a presented key, recording the use if it is known.
#[instrument(skip(store, key), fields(key = %key.redacted()))]
pub async fn validate_key(store: &dyn MetadataStore, key: &ApiKey) -> MetadataResult<bool> {
    let known = store.touch_api_key(key, OffsetDateTime::now_utc()).await?;
    if !known {
        tracing::debug!("Unknown API key");
    }
    Ok(known)
}
