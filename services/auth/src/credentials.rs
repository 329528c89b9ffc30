//! Username/password verification against the durable identity store

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::Arc;
use tracing::{error, warn};

use crate::{
    error::{AuthError, AuthResult},
    models::Identity,
    repositories::IdentityStore,
};

/// Hash a password with Argon2 and a fresh random salt
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Check `password` against a stored PHC hash string
fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Argon2id hash with the default cost parameters, verified when the
/// username is unknown so both failure paths pay for one verification.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bGVkZ2VyZGVjb3lzYWx0MA$MAY8zidwhzg4y18sF7OljPnI6m4jU6ZhzBzbf8fqa7U";

/// Verifies credentials against an [`IdentityStore`]
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn IdentityStore>,
}

impl CredentialVerifier {
    /// Create a verifier over the given identity store
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Verify a username/password pair.
    ///
    /// While the store holds no identities at all, verification is skipped
    /// and the zero-value identity is returned so the first user can be
    /// created.
    pub async fn verify(&self, username: &str, password: &str) -> AuthResult<Identity> {
        if self.store.count_identities().await? == 0 {
            warn!(
                "No identities registered, admitting bootstrap session for {:?}",
                username
            );
            return Ok(Identity::default());
        }

        let identity = self.store.find_by_username(username).await?;
        let (stored_hash, identity) = match identity {
            Some(identity) => (identity.password_hash.clone(), Some(identity)),
            None => (DECOY_HASH.to_string(), None),
        };

        let password = password.to_string();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                .await
                .map_err(|e| {
                    AuthError::Store(anyhow::anyhow!("Password verification task failed: {}", e))
                })?;

        match identity {
            Some(identity) if matches => Ok(identity),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
