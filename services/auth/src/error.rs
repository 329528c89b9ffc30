//! Error types for the session-authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure raised by login, logout or request authorization
#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are never told apart
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No token on the request, or the token does not name a live session
    #[error("session has expired or is missing")]
    SessionExpiredOrMissing,

    /// The session is valid but the permission rule rejected the request
    #[error("permission denied")]
    PermissionDenied,

    /// The token generator could not produce a fresh token
    #[error("failed to generate session token: {0}")]
    TokenGeneration(String),

    /// The requested lifetime puts the expiry past the representable range
    #[error("invalid session lifetime: {0}")]
    SessionLifetime(String),

    /// The durable identity store failed
    #[error("identity store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl AuthError {
    /// True for the failures reported to clients as "not authenticated"
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionExpiredOrMissing
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthError::InvalidCredentials | AuthError::SessionExpiredOrMissing => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            AuthError::PermissionDenied => (StatusCode::FORBIDDEN, "Forbidden"),
            AuthError::TokenGeneration(_)
            | AuthError::SessionLifetime(_)
            | AuthError::Store(_) => {
                error!("Authentication failed internally: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
