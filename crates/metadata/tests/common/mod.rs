use cfipd_metadata::JsonStore;
use std::sync::Arc;
use tempfile::TempDir;

/// A JSON store in a fresh temp directory. Keep the `TempDir` alive.
pub async fn temp_store() -> (Arc<JsonStore>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::new(dir.path().join("users.json"), dir.path().join("api_keys.json"))
        .await
        .unwrap();
    (Arc::new(store), dir)
}
