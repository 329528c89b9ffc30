//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::RwLock;

use ledger_auth::{
    Authenticator, CredentialVerifier, SessionPolicy, SessionStore,
    clock::ManualClock,
    credentials::hash_password,
    models::Identity,
    repositories::IdentityStore,
    token::OsRngTokenGenerator,
};

/// Identity store held in memory
#[derive(Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<Vec<Identity>>,
}

impl MemoryIdentityStore {
    /// Register a user with a freshly hashed password
    pub async fn insert(&self, username: &str, password: &str, admin: bool) -> Identity {
        let mut identities = self.identities.write().await;
        let identity = Identity {
            id: identities.len() as i64 + 1,
            username: username.to_string(),
            name: username.to_uppercase(),
            password_hash: hash_password(password).unwrap(),
            admin,
        };
        identities.push(identity.clone());
        identity
    }

    /// Flip the admin flag of a stored user
    pub async fn set_admin(&self, username: &str, admin: bool) {
        let mut identities = self.identities.write().await;
        if let Some(identity) = identities.iter_mut().find(|i| i.username == username) {
            identity.admin = admin;
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities
            .iter()
            .find(|identity| identity.username == username)
            .cloned())
    }

    async fn count_identities(&self) -> anyhow::Result<i64> {
        Ok(self.identities.read().await.len() as i64)
    }
}

/// Everything a test needs to drive the authenticator
pub struct Harness {
    pub identities: Arc<MemoryIdentityStore>,
    pub clock: Arc<ManualClock>,
    pub sessions: Arc<SessionStore>,
    pub authenticator: Authenticator,
}

/// Authenticator with a 3 hour default TTL, 15 minute bootstrap TTL and a
/// 1 hour renewal threshold, on a manual clock
pub fn harness() -> Harness {
    let identities = Arc::new(MemoryIdentityStore::default());
    let clock = Arc::new(ManualClock::default());
    let sessions = Arc::new(SessionStore::with_parts(
        Duration::hours(3),
        clock.clone(),
        Arc::new(OsRngTokenGenerator),
    ));
    let authenticator = Authenticator::new(
        CredentialVerifier::new(identities.clone()),
        sessions.clone(),
        SessionPolicy::default(),
    );

    Harness {
        identities,
        clock,
        sessions,
        authenticator,
    }
}
