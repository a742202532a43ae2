//! Login credentials.

use serde::Deserialize;
use std::fmt;

/// Username/password pair submitted through the login or register form.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Build credentials, rejecting blank fields.
    ///
    /// The username is trimmed; the password is kept byte-for-byte.
    pub fn new(username: &str, password: &str) -> crate::Result<Self> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(crate::Error::EmptyCredentials);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_username() {
        let creds = Credentials::new("  admin ", "secret").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_new_rejects_blank_fields() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("   ", "secret").is_err());
        assert!(Credentials::new("admin", "").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("admin", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
