//! Durable identity lookups consumed by the credential verifier

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Identity;

pub mod identity;

pub use identity::PgIdentityStore;

/// Read access to the durable identity store
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the identity registered under `username`
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    /// Number of identities registered
    async fn count_identities(&self) -> Result<i64>;
}
