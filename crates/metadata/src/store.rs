//! Metadata store trait and the JSON-file implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::models::{ApiKeyRow, UserRow};
use crate::repos::{ApiKeyRepo, UserRepo};
use async_trait::async_trait;
use cfipd_core::ApiKey;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: UserRepo + ApiKeyRepo + Send + Sync {
    /// Check that the backing files are reachable.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// A JSON document on disk guarded by its own lock.
///
/// Every read-modify-write runs inside the lock and the document is replaced
/// through a temp file and rename, so readers never see a partial write.
struct JsonFile<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    /// Read the current document.
    async fn read(&self) -> MetadataResult<T> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Apply `f` to the document and persist the result.
    ///
    /// Nothing is written if `f` fails.
    async fn update<R, F>(&self, f: F) -> MetadataResult<R>
    where
        F: FnOnce(&mut T) -> MetadataResult<R> + Send,
        R: Send,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.save(&doc).await?;
        Ok(out)
    }

    /// A missing or empty file is an empty document.
    async fn load(&self) -> MetadataResult<T> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, doc: &T) -> MetadataResult<()> {
        let data = serde_json::to_vec_pretty(doc)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp_path = self
            .path
            .with_file_name(format!(".{file_name}.tmp.{}", Uuid::new_v4()));

        let written = async {
            let mut options = fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            options.mode(0o600);
            let mut file = options.open(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

type UserDoc = BTreeMap<String, UserRow>;
type ApiKeyDoc = BTreeMap<String, ApiKeyRow>;

/// Metadata store backed by two JSON files.
pub struct JsonStore {
    users: JsonFile<UserDoc>,
    api_keys: JsonFile<ApiKeyDoc>,
}

impl JsonStore {
    /// Open the store, creating parent directories as needed.
    ///
    /// Existing files are parsed once so a corrupt store fails at start-up
    /// rather than on the first login.
    pub async fn new(
        users_path: impl AsRef<Path>,
        api_keys_path: impl AsRef<Path>,
    ) -> MetadataResult<Self> {
        let users_path = users_path.as_ref().to_path_buf();
        let api_keys_path = api_keys_path.as_ref().to_path_buf();
        for path in [&users_path, &api_keys_path] {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).await?;
            }
        }

        let store = Self {
            users: JsonFile::new(users_path),
            api_keys: JsonFile::new(api_keys_path),
        };

        let users = store.users.read().await?;
        let keys = store.api_keys.read().await?;
        tracing::info!(
            users_path = %store.users.path.display(),
            api_keys_path = %store.api_keys.path.display(),
            users = users.len(),
            api_keys = keys.len(),
            "Opened JSON metadata store"
        );

        Ok(store)
    }
}

#[async_trait]
impl UserRepo for JsonStore {
    async fn has_users(&self) -> MetadataResult<bool> {
        Ok(!self.users.read().await?.is_empty())
    }

    async fn get_user(&self, username: &str) -> MetadataResult<Option<UserRow>> {
        Ok(self.users.read().await?.remove(username))
    }

    async fn create_first_user(&self, user: &UserRow) -> MetadataResult<()> {
        let user = user.clone();
        self.users
            .update(move |doc| {
                if !doc.is_empty() {
                    return Err(MetadataError::AlreadyExists(
                        "a user is already registered".to_string(),
                    ));
                }
                doc.insert(user.username.clone(), user);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl ApiKeyRepo for JsonStore {
    async fn create_api_key(&self, key: &ApiKey, row: &ApiKeyRow) -> MetadataResult<()> {
        let key = key.as_str().to_string();
        let row = row.clone();
        self.api_keys
            .update(move |doc| {
                if doc.contains_key(&key) {
                    return Err(MetadataError::AlreadyExists("api key".to_string()));
                }
                doc.insert(key, row);
                Ok(())
            })
            .await
    }

    async fn get_api_key(&self, key: &ApiKey) -> MetadataResult<Option<ApiKeyRow>> {
        Ok(self.api_keys.read().await?.remove(key.as_str()))
    }

    async fn touch_api_key(&self, key: &ApiKey, used_at: OffsetDateTime) -> MetadataResult<bool> {
        // Unknown keys are answered without rewriting the file.
        if !self.api_keys.read().await?.contains_key(key.as_str()) {
            return Ok(false);
        }

        let key = key.as_str().to_string();
        self.api_keys
            .update(move |doc| match doc.get_mut(&key) {
                Some(row) => {
                    row.last_used = Some(used_at);
                    Ok(true)
                }
                None => Ok(false),
            })
            .await
    }
}

#[async_trait]
impl MetadataStore for JsonStore {
    async fn health_check(&self) -> MetadataResult<()> {
        for path in [&self.users.path, &self.api_keys.path] {
            let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
                continue;
            };
            let meta = fs::metadata(parent).await?;
            if !meta.is_dir() {
                return Err(MetadataError::Internal(format!(
                    "metadata directory is not a directory: {}",
                    parent.display()
                )));
            }
        }
        Ok(())
    }
}
