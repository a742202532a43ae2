//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5001").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes; larger uploads get a 413.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Enable the /metrics endpoint for Prometheus scraping (default: false).
    #[serde(default)]
    pub metrics_enabled: bool,
    /// Send permissive CORS headers (default: true).
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

fn default_max_upload_bytes() -> u64 {
    crate::MAX_UPLOAD_SIZE
}

fn default_cors_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            metrics_enabled: false,
            cors_enabled: default_cors_enabled(),
        }
    }
}

impl ServerConfig {
    /// Body limit as a `usize`, saturating on 32-bit targets.
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_upload_bytes).unwrap_or(usize::MAX)
    }
}

/// Single-slot storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the slot file.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// How long a directory listing may be served from cache, in milliseconds.
    #[serde(default = "default_list_cache_ttl_ms")]
    pub list_cache_ttl_ms: u64,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_list_cache_ttl_ms() -> u64 {
    2000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            list_cache_ttl_ms: default_list_cache_ttl_ms(),
        }
    }
}

impl StorageConfig {
    /// Get the listing cache TTL as a Duration.
    pub fn list_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.list_cache_ttl_ms)
    }
}

/// JSON-backed credential and API key stores.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// File mapping usernames to password-hash records.
    #[serde(default = "default_users_path")]
    pub users_path: PathBuf,
    /// File mapping API keys to usage records.
    #[serde(default = "default_api_keys_path")]
    pub api_keys_path: PathBuf,
}

fn default_users_path() -> PathBuf {
    PathBuf::from("./data/users.json")
}

fn default_api_keys_path() -> PathBuf {
    PathBuf::from("./data/api_keys.json")
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            users_path: default_users_path(),
            api_keys_path: default_api_keys_path(),
        }
    }
}

/// Login session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds (default: 24 hours).
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    /// Interval in seconds between sweeps of expired sessions.
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
    /// Mark the cookie `Secure` (enable when served over HTTPS).
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_cookie_name() -> String {
    "cfipd_session".to_string()
}

fn default_session_ttl_secs() -> u64 {
    86400
}

fn default_prune_interval_secs() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl_secs(),
            prune_interval_secs: default_prune_interval_secs(),
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Get the session lifetime as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Get the prune interval as a Duration.
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}

/// Access control switches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Require a session or API key on `/generate-api-key` and `/clear-files`.
    /// Off by default: both routes are open, as they always have been.
    #[serde(default)]
    pub protect_open_routes: bool,
}

/// Passive expiry of stale slot files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Run the periodic expiry task (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Interval in seconds between sweeps (default: 1 hour).
    #[serde(default = "default_cleanup_interval_secs")]
    pub interval_secs: u64,
    /// Files older than this many seconds are removed (default: 24 hours).
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_max_age_secs() -> u64 {
    crate::DEFAULT_FILE_MAX_AGE_SECS
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_cleanup_interval_secs(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl CleanupConfig {
    /// Get the sweep interval as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Get the maximum file age as a Duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Slot storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Credential and API key store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Access control configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Expiry sweep configuration.
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

impl AppConfig {
    /// Create a test configuration rooted in `dir`.
    ///
    /// **For testing only.** Storage and both JSON stores live under `dir`,
    /// and the listing cache is disabled so assertions see fresh state.
    pub fn for_testing(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            storage: StorageConfig {
                path: dir.join("uploads"),
                list_cache_ttl_ms: 0,
            },
            metadata: MetadataConfig {
                users_path: dir.join("users.json"),
                api_keys_path: dir.join("api_keys.json"),
            },
            ..Default::default()
        }
    }

    /// Validate configuration invariants.
    /// Returns an error for settings that would break at runtime.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes cannot be 0".to_string());
        }
        if self.session.ttl_secs == 0 {
            return Err("session.ttl_secs cannot be 0".to_string());
        }
        // Zero intervals would make tokio::time::interval panic.
        if self.session.prune_interval_secs == 0 {
            return Err("session.prune_interval_secs cannot be 0".to_string());
        }
        if self.cleanup.enabled && self.cleanup.interval_secs == 0 {
            return Err("cleanup.interval_secs cannot be 0 when cleanup is enabled".to_string());
        }
        if self.session.cookie_name.is_empty() {
            return Err("session.cookie_name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_service() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:5001");
        assert_eq!(config.server.max_upload_bytes, 16 * 1024 * 1024);
        assert!(config.server.cors_enabled);
        assert!(!config.auth.protect_open_routes);
        assert!(!config.cleanup.enabled);
        assert_eq!(config.cleanup.max_age(), Duration::from_secs(24 * 60 * 60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_document() {
        let json = r#"{"server": {"bind": "127.0.0.1:9000"}, "cleanup": {"enabled": true}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.max_upload_bytes, crate::MAX_UPLOAD_SIZE);
        assert!(config.cleanup.enabled);
        assert_eq!(config.cleanup.interval_secs, 3600);
        assert_eq!(config.session.cookie_name, "cfipd_session");
    }

    #[test]
    fn test_validate_rejects_zero_intervals() {
        let mut config = AppConfig::default();
        config.session.prune_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cleanup.enabled = true;
        config.cleanup.interval_secs = 0;
        assert!(config.validate().is_err());

        // A zero interval is harmless while the sweep is disabled.
        config.cleanup.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let mut config = AppConfig::default();
        config.server.max_upload_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_for_testing_roots_paths() {
        let config = AppConfig::for_testing("/tmp/cfipd-test");
        assert_eq!(config.storage.path, PathBuf::from("/tmp/cfipd-test/uploads"));
        assert_eq!(
            config.metadata.users_path,
            PathBuf::from("/tmp/cfipd-test/users.json")
        );
        assert_eq!(config.storage.list_cache_ttl(), Duration::ZERO);
    }
}
