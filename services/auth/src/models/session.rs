//! Session records and the values handed back to callers

use chrono::{DateTime, Utc};

use super::identity::Identity;

/// One live session: the identity snapshot and when it lapses
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

impl SessionEntry {
    /// A session is expired from its expiry instant onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    /// Identity without its password hash
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

/// A request that passed authorization
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: String,
    pub identity: Identity,
    /// Expiry after any renewal triggered by this request
    pub expires_at: DateTime<Utc>,
}

/// Snapshot of the store's bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Entries in the token map, including expired ones not yet swept
    pub sessions: usize,
    /// Usernames with at least one indexed token
    pub usernames: usize,
    /// Tokens across all username index entries
    pub indexed_tokens: usize,
}
