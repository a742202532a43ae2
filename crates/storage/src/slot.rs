//! Single-slot file store.
//!
//! The slot holds at most one upload, stored under its canonical name
//! (`cfip.csv` or `cfip.txt`). Every mutation runs under one async mutex:
//! a replace deletes the other occupants before the new content is renamed
//! into place, so a listing never shows two canonical files.
//!
//! Deletion is best-effort. A file that cannot be removed is logged and
//! reported, but never fails the surrounding replace, clear or sweep.

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectStore;
use bytes::Bytes;
use cfipd_core::{FileKind, StoredFile};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tokio::sync::Mutex as AsyncMutex;

/// Outcome of clearing the slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Files that were removed.
    pub removed: Vec<String>,
    /// Files that could not be removed (already logged).
    pub failed: Vec<String>,
}

/// Outcome of an expiry sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files inspected.
    pub examined: usize,
    /// Files removed for being older than the cutoff.
    pub removed: Vec<String>,
    /// Files that could not be inspected or removed (already logged).
    pub failed: Vec<String>,
}

struct CachedListing {
    fetched_at: Instant,
    names: BTreeSet<String>,
}

/// Storage area holding at most one uploaded file.
pub struct SlotStore {
    backend: Arc<dyn ObjectStore>,
    write_lock: AsyncMutex<()>,
    list_cache: Mutex<Option<CachedListing>>,
    list_ttl: Duration,
}

impl SlotStore {
    /// Create a slot over `backend`. A zero `list_ttl` disables listing cache.
    pub fn new(backend: Arc<dyn ObjectStore>, list_ttl: Duration) -> Self {
        Self {
            backend,
            write_lock: AsyncMutex::new(()),
            list_cache: Mutex::new(None),
            list_ttl,
        }
    }

    /// Get the underlying backend.
    pub fn backend(&self) -> &Arc<dyn ObjectStore> {
        &self.backend
    }

    /// Store `content` as the only file in the slot.
    ///
    /// Rejects empty names and anything that is not csv/txt before touching
    /// storage, so a rejected upload leaves the slot as it was.
    pub async fn replace(&self, filename: &str, content: Bytes) -> StorageResult<StoredFile> {
        let kind = FileKind::from_filename(filename)?;
        let target = kind.canonical_name();
        let size = content.len() as u64;

        let _guard = self.write_lock.lock().await;
        let result = async {
            let existing = self.backend.list().await?;
            let replaced = !existing.is_empty();

            let stale: Vec<String> = existing.into_iter().filter(|n| *n != target).collect();
            let removal = self.remove_each(&stale).await;

            self.backend.put(&target, content).await?;
            Ok::<_, StorageError>((replaced, removal.failed.len()))
        }
        .await;
        self.invalidate_listing();

        let (replaced, stale_left) = result?;
        tracing::info!(
            filename = %target,
            original = %filename,
            size = size,
            replaced = replaced,
            "Stored upload"
        );

        Ok(StoredFile {
            filename: target,
            originalname: filename.to_string(),
            replaced,
            size,
            stale_left,
        })
    }

    /// Delete every file in the slot.
    ///
    /// Only a failure to enumerate the slot is an error; per-file failures
    /// land in the report.
    pub async fn clear(&self) -> StorageResult<ClearReport> {
        let _guard = self.write_lock.lock().await;
        let result = async {
            let existing = self.backend.list().await?;
            Ok::<_, StorageError>(self.remove_each(&existing).await)
        }
        .await;
        self.invalidate_listing();

        let report = result?;
        tracing::info!(
            removed = report.removed.len(),
            failed = report.failed.len(),
            "Cleared upload slot"
        );
        Ok(report)
    }

    /// Read a stored file by name.
    pub async fn fetch(&self, filename: &str) -> StorageResult<Bytes> {
        self.backend.get(filename).await
    }

    /// Names currently in the slot (zero or one entries in normal operation).
    ///
    /// May be up to the configured TTL stale.
    pub async fn list(&self) -> StorageResult<BTreeSet<String>> {
        if !self.list_ttl.is_zero()
            && let Some(cached) = self.cached_listing()
        {
            return Ok(cached);
        }

        let names: BTreeSet<String> = self.backend.list().await?.into_iter().collect();
        if !self.list_ttl.is_zero()
            && let Ok(mut cache) = self.list_cache.lock()
        {
            *cache = Some(CachedListing {
                fetched_at: Instant::now(),
                names: names.clone(),
            });
        }
        Ok(names)
    }

    /// Remove files whose modification time is older than `max_age`.
    pub async fn sweep_expired(&self, max_age: Duration) -> StorageResult<SweepReport> {
        let _guard = self.write_lock.lock().await;
        let result = self.sweep_locked(max_age).await;
        self.invalidate_listing();
        result
    }

    /// Verify the backing storage is usable.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.backend.health_check().await
    }

    async fn sweep_locked(&self, max_age: Duration) -> StorageResult<SweepReport> {
        // An age reaching past the representable calendar expires nothing.
        let Some(cutoff) = time::Duration::try_from(max_age)
            .ok()
            .and_then(|age| OffsetDateTime::now_utc().checked_sub(age))
        else {
            tracing::debug!(?max_age, "Expiry cutoff out of range, nothing to sweep");
            return Ok(SweepReport::default());
        };
        let names = self.backend.list().await?;
        let mut report = SweepReport {
            examined: names.len(),
            ..Default::default()
        };

        for name in names {
            let meta = match self.backend.head(&name).await {
                Ok(meta) => meta,
                Err(StorageError::NotFound(_)) => continue,
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "Failed to inspect file during expiry sweep");
                    report.failed.push(name);
                    continue;
                }
            };

            let Some(modified) = meta.last_modified else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match self.backend.delete(&name).await {
                Ok(()) | Err(StorageError::NotFound(_)) => {
                    tracing::info!(file = %name, modified = %modified, "Removed expired file");
                    report.removed.push(name);
                }
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "Failed to remove expired file");
                    report.failed.push(name);
                }
            }
        }

        Ok(report)
    }

    async fn remove_each(&self, names: &[String]) -> ClearReport {
        let mut report = ClearReport::default();
        for name in names {
            match self.backend.delete(name).await {
                Ok(()) => report.removed.push(name.clone()),
                Err(StorageError::NotFound(_)) => {
                    tracing::debug!(file = %name, "File already gone");
                    report.removed.push(name.clone());
                }
                Err(e) => {
                    tracing::error!(file = %name, error = %e, "Failed to remove file");
                    report.failed.push(name.clone());
                }
            }
        }
        report
    }

    fn cached_listing(&self) -> Option<BTreeSet<String>> {
        let cache = self.list_cache.lock().ok()?;
        cache
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < self.list_ttl)
            .map(|c| c.names.clone())
    }

    fn invalidate_listing(&self) {
        if let Ok(mut cache) = self.list_cache.lock() {
            *cache = None;
        }
    }
}
