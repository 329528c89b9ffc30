//! In-memory session store
//!
//! Maps opaque tokens to an identity snapshot and an expiry, and keeps a
//! reverse index from username to live tokens for mass logout. Both maps
//! sit behind one reader/writer lock and are only ever changed together.
//! Nothing awaits while the lock is held except the lock itself.

use chrono::{DateTime, Duration, Utc};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    clock::{Clock, SystemClock},
    error::{AuthError, AuthResult},
    models::{Identity, SessionEntry, SessionStats},
    token::{OsRngTokenGenerator, TokenGenerator},
};

/// Fresh tokens drawn before giving up on finding an unused one
const MAX_TOKEN_ATTEMPTS: usize = 4;

#[derive(Debug, Default)]
struct SessionTable {
    sessions: HashMap<String, SessionEntry>,
    by_username: HashMap<String, HashSet<String>>,
}

impl SessionTable {
    fn insert(&mut self, token: String, entry: SessionEntry) {
        self.by_username
            .entry(entry.identity.username.clone())
            .or_default()
            .insert(token.clone());
        self.sessions.insert(token, entry);
    }

    fn remove(&mut self, token: &str) -> Option<SessionEntry> {
        let entry = self.sessions.remove(token)?;

        if let Some(tokens) = self.by_username.get_mut(&entry.identity.username) {
            tokens.remove(token);
            if tokens.is_empty() {
                self.by_username.remove(&entry.identity.username);
            }
        }

        Some(entry)
    }
}

/// Concurrent session cache shared by every request handler
pub struct SessionStore {
    table: RwLock<SessionTable>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn TokenGenerator>,
}

impl SessionStore {
    /// Create a store on the wall clock with OS-random tokens
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_parts(
            default_ttl,
            Arc::new(SystemClock),
            Arc::new(OsRngTokenGenerator),
        )
    }

    /// Create a store with an explicit clock and token generator
    pub fn with_parts(
        default_ttl: Duration,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn TokenGenerator>,
    ) -> Self {
        Self {
            table: RwLock::new(SessionTable::default()),
            default_ttl,
            clock,
            generator,
        }
    }

    /// TTL used when a caller passes a non-positive duration
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Current time according to the store's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn effective(&self, duration: Duration) -> Duration {
        if duration <= Duration::zero() {
            self.default_ttl
        } else {
            duration
        }
    }

    /// Register a session for `identity` and return its token.
    ///
    /// A non-positive `ttl` means the store's default TTL.
    pub async fn register_session(&self, identity: Identity, ttl: Duration) -> AuthResult<String> {
        let (token, _) = self.open_session(identity, ttl).await?;
        Ok(token)
    }

    /// Register a session and return its token together with the expiry
    /// that was stored for it.
    pub async fn open_session(
        &self,
        identity: Identity,
        ttl: Duration,
    ) -> AuthResult<(String, DateTime<Utc>)> {
        let ttl = self.effective(ttl);

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = self.generator.generate()?;

            let mut table = self.table.write().await;
            if table.sessions.contains_key(&token) {
                debug!("Generated token collided with a live session, retrying");
                continue;
            }

            let expires_at = self.clock.now().checked_add_signed(ttl).ok_or_else(|| {
                AuthError::SessionLifetime(format!("ttl of {} is out of range", ttl))
            })?;
            table.insert(token.clone(), SessionEntry {
                identity,
                expires_at,
            });

            return Ok((token, expires_at));
        }

        Err(AuthError::TokenGeneration(format!(
            "no unused token after {} attempts",
            MAX_TOKEN_ATTEMPTS
        )))
    }

    /// Look up a live session.
    ///
    /// Entries past their expiry are reported missing even before the sweep
    /// has evicted them.
    pub async fn get_session(&self, token: &str) -> Option<SessionEntry> {
        let now = self.clock.now();
        let table = self.table.read().await;

        table
            .sessions
            .get(token)
            .filter(|entry| !entry.is_expired_at(now))
            .cloned()
    }

    /// Remove a session; absent tokens are ignored
    pub async fn remove_session(&self, token: &str) {
        let mut table = self.table.write().await;
        table.remove(token);
    }

    /// Push a live session's expiry back by `extra` (the default TTL when
    /// `extra` is non-positive). Returns the new expiry, or `None` when the
    /// token is absent or already expired. Expiries saturate at the latest
    /// representable instant.
    pub async fn prolong_session(&self, token: &str, extra: Duration) -> Option<DateTime<Utc>> {
        let extra = self.effective(extra);
        let now = self.clock.now();
        let mut table = self.table.write().await;

        let entry = table.sessions.get_mut(token)?;
        if entry.is_expired_at(now) {
            return None;
        }

        entry.expires_at = entry
            .expires_at
            .checked_add_signed(extra)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(entry.expires_at)
    }

    /// Remove every session issued to `username`. Returns how many were dropped.
    pub async fn remove_username(&self, username: &str) -> usize {
        let mut table = self.table.write().await;

        let Some(tokens) = table.by_username.remove(username) else {
            return 0;
        };

        let removed = tokens.len();
        for token in tokens {
            table.sessions.remove(&token);
        }

        removed
    }

    /// Evict every expired session. Returns how many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut table = self.table.write().await;

        let expired: Vec<String> = table
            .sessions
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(token, _)| token.clone())
            .collect();

        for token in &expired {
            table.remove(token);
        }

        if !expired.is_empty() {
            info!("Swept {} expired sessions", expired.len());
        }

        expired.len()
    }

    /// Tokens currently indexed under `username`
    pub async fn tokens_for(&self, username: &str) -> Vec<String> {
        let table = self.table.read().await;

        table
            .by_username
            .get(username)
            .map(|tokens| tokens.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Counts of the store's internal structures
    pub async fn stats(&self) -> SessionStats {
        let table = self.table.read().await;

        SessionStats {
            sessions: table.sessions.len(),
            usernames: table.by_username.len(),
            indexed_tokens: table.by_username.values().map(HashSet::len).sum(),
        }
    }
}
