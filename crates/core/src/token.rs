//! API keys and random session secrets.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes of entropy in every generated secret.
pub const SECRET_BYTES: usize = 32;

/// Length of an encoded secret (32 bytes, URL-safe base64, no padding).
pub const SECRET_LEN: usize = 43;

/// Upper bound on the length of a client-presented key.
const MAX_PRESENTED_KEY_LEN: usize = 256;

/// Generate a random URL-safe secret using a cryptographically secure RNG.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// An API key as issued to machine clients.
///
/// Keys are opaque bearer tokens. They are stored as-is, so the `Debug`
/// impl only shows a short prefix to keep them out of logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self(generate_secret())
    }

    /// Wrap a key presented by a client.
    ///
    /// Only the shape is checked; whether the key was ever issued is up to
    /// the key store.
    pub fn parse(value: &str) -> crate::Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(crate::Error::InvalidApiKey("empty key".to_string()));
        }
        if value.len() > MAX_PRESENTED_KEY_LEN {
            return Err(crate::Error::InvalidApiKey(format!(
                "key longer than {MAX_PRESENTED_KEY_LEN} characters"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Get the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, log-safe prefix of the key.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}...")
    }

    /// Consume into the plaintext value (returned to the client exactly once).
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.redacted())
    }
}
