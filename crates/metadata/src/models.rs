//! Records persisted in the JSON stores.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Registered user, keyed by username in `users.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Issued API key record, keyed by the key itself in `api_keys.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRow {
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_used: Option<OffsetDateTime>,
}

impl ApiKeyRow {
    /// A record for a key issued at `created_at` and never used.
    pub fn issued_at(created_at: OffsetDateTime) -> Self {
        Self {
            created_at,
            last_used: None,
        }
    }
}
