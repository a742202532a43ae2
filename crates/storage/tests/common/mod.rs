pub mod mocks;

#[allow(unused_imports)]
pub use mocks::MemoryBackend;

use cfipd_storage::SlotStore;
use std::sync::Arc;
use std::time::Duration;

/// Slot over a fresh memory backend, listing cache disabled.
#[allow(dead_code)]
pub fn memory_slot() -> (SlotStore, Arc<MemoryBackend>) {
    let backend = MemoryBackend::new();
    let slot = SlotStore::new(backend.clone(), Duration::ZERO);
    (slot, backend)
}
