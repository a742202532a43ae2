//! In-memory login sessions.

use axum_extra::extract::cookie::{Cookie, SameSite};
use cfipd_core::config::SessionConfig;
use cfipd_core::generate_secret;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A logged-in browser session.
#[derive(Clone, Debug)]
struct SessionEntry {
    username: String,
    /// `None` when the lifetime is too long to represent.
    expires_at: Option<Instant>,
}

impl SessionEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Session token → user map with a fixed lifetime.
///
/// Sessions are not persisted; a restart logs everyone out.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<DashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `username` and return its token.
    pub fn create(&self, username: &str) -> String {
        let token = generate_secret();
        self.entries.insert(
            token.clone(),
            SessionEntry {
                username: username.to_string(),
                expires_at: Instant::now().checked_add(self.ttl),
            },
        );
        token
    }

    /// Resolve a token to its username. Expired sessions are dropped.
    pub fn lookup(&self, token: &str) -> Option<String> {
        let now = Instant::now();
        let username = {
            let entry = self.entries.get(token)?;
            entry.is_live(now).then(|| entry.username.clone())
        };
        if username.is_none() {
            self.entries.remove_if(token, |_, entry| !entry.is_live(now));
        }
        username
    }

    /// End a session.
    pub fn remove(&self, token: &str) -> bool {
        self.entries.remove(token).is_some()
    }

    /// Drop every expired session and return how many were evicted.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked sessions, expired ones included until pruned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sessions are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    let max_age = i64::try_from(config.ttl_secs).unwrap_or(i64::MAX);
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Cookie that clears the session cookie in the browser.
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build(config.cookie_name.clone()).path("/").build()
}

/// Spawn a background task that periodically evicts expired sessions.
pub fn spawn_prune_task(store: SessionStore, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let evicted = store.prune();
            if evicted > 0 {
                tracing::info!(evicted = evicted, "Session prune task evicted expired sessions");
            }
        }
    })
}
