//! Identity snapshot held by live sessions

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A ledger user as stored in the durable identity store.
///
/// Sessions keep a copy taken at login. Later edits to the stored record are
/// not reflected until the holder logs in again; the user-management layer
/// forces a mass logout whenever one of these fields changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password_hash: String,
    pub admin: bool,
}

impl Identity {
    /// True for the placeholder identity admitted while no users exist yet
    pub fn is_bootstrap(&self) -> bool {
        self.id == 0
    }

    /// Copy of this identity with the password hash removed
    pub fn without_secret(&self) -> Self {
        Self {
            password_hash: String::new(),
            ..self.clone()
        }
    }
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}
