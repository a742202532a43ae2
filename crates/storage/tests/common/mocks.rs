use async_trait::async_trait;
use bytes::Bytes;
use cfipd_storage::error::{StorageError, StorageResult};
use cfipd_storage::traits::{ObjectMeta, ObjectStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;

struct Entry {
    data: Bytes,
    modified: OffsetDateTime,
}

/// In-memory backend with failure injection.
///
/// Deletes of names in `undeletable` fail with an I/O error, and
/// `fail_listing` makes every `list` call fail. Modification times can be
/// backdated to exercise expiry.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryBackend {
    objects: Mutex<BTreeMap<String, Entry>>,
    undeletable: Mutex<HashSet<String>>,
    fail_listing: std::sync::atomic::AtomicBool,
    pub list_calls: AtomicUsize,
    pub put_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert an object directly, bypassing the slot.
    pub fn seed(&self, key: &str, data: &'static [u8]) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            Entry {
                data: Bytes::from_static(data),
                modified: OffsetDateTime::now_utc(),
            },
        );
    }

    /// Move an object's modification time into the past.
    pub fn backdate(&self, key: &str, by: time::Duration) {
        if let Some(entry) = self.objects.lock().unwrap().get_mut(key) {
            entry.modified -= by;
        }
    }

    pub fn make_undeletable(&self, key: &str) {
        self.undeletable.lock().unwrap().insert(key.to_string());
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        let objects = self.objects.lock().unwrap();
        let entry = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMeta {
            size: entry.data.len() as u64,
            last_modified: Some(entry.modified),
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|e| e.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            Entry {
                data,
                modified: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.undeletable.lock().unwrap().contains(key) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{key} is locked"),
            )));
        }
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("listing failed")));
        }
        Ok(self.keys())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
