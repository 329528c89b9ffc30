//! Postgres-backed identity store

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::IdentityStore;
use crate::models::Identity;

/// Identity repository over the ledger's `users` table
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Create a new identity repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        debug!("Finding identity by username: {}", username);

        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, name, password_hash, admin
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn count_identities(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
