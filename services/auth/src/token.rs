//! Session token generation

use rand::{RngCore, rngs::OsRng};
use uuid::{Builder, Uuid};

use crate::error::{AuthError, AuthResult};

/// Produces opaque session identifiers
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> AuthResult<String>;
}

/// Random v4 UUIDs drawn straight from the operating system's CSPRNG.
///
/// Entropy failures are reported instead of falling back to a weaker source.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRngTokenGenerator;

impl TokenGenerator for OsRngTokenGenerator {
    fn generate(&self) -> AuthResult<String> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        let token: Uuid = Builder::from_random_bytes(bytes).into_uuid();
        Ok(token.to_string())
    }
}
