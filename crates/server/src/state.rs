//! Application state shared across handlers.

use crate::session::SessionStore;
use cfipd_core::config::AppConfig;
use cfipd_metadata::MetadataStore;
use cfipd_storage::SlotStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed after start-up.
    pub config: Arc<AppConfig>,
    /// The single-slot upload store.
    pub slot: Arc<SlotStore>,
    /// Credential and API key store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Live login sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, slot: SlotStore, metadata: Arc<dyn MetadataStore>) -> Self {
        let sessions = SessionStore::new(config.session.ttl());
        Self {
            config: Arc::new(config),
            slot: Arc::new(slot),
            metadata,
            sessions,
        }
    }
}
