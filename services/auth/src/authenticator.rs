//! Login, logout and per-request authorization over the session store

use axum::http::{HeaderMap, Method};
use axum_extra::extract::cookie::CookieJar;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    credentials::CredentialVerifier,
    error::{AuthError, AuthResult},
    models::{AuthenticatedSession, Identity, LoginOutcome},
    session::SessionStore,
};

/// Request header carrying the session token (`X-Session-Server`), in the
/// lowercase form `HeaderName` expects
pub const SESSION_HEADER: &str = "x-session-server";

/// Cookie carrying the session token; wins over the header when both are set
pub const SESSION_COOKIE: &str = "session-server";

/// Decides whether an identity may perform `method` on `path`
pub type PermissionRule = Arc<dyn Fn(&Identity, &Method, &str) -> bool + Send + Sync>;

/// Session lifetimes applied by the authenticator
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    /// Lifetime of sessions admitted under the bootstrap condition
    pub bootstrap_ttl: Duration,
    /// Sessions with less time left than this are renewed when used
    pub renew_threshold: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            bootstrap_ttl: Duration::minutes(15),
            renew_threshold: Duration::hours(1),
        }
    }
}

/// Read the session token from request headers.
///
/// The `session-server` cookie takes precedence over the `X-Session-Server`
/// header. Empty values count as absent.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// Entry point for request-handling code
pub struct Authenticator {
    verifier: CredentialVerifier,
    sessions: Arc<SessionStore>,
    rule: Option<PermissionRule>,
    policy: SessionPolicy,
}

impl Authenticator {
    /// Create an authenticator without a permission rule
    pub fn new(
        verifier: CredentialVerifier,
        sessions: Arc<SessionStore>,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            verifier,
            sessions,
            rule: None,
            policy,
        }
    }

    /// Check every authorized request against `rule`
    pub fn with_rule(mut self, rule: PermissionRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// The session store backing this authenticator
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Verify credentials and open a session.
    ///
    /// Bootstrap identities get the short bootstrap TTL, everyone else the
    /// store's default. The returned identity carries no password hash.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<LoginOutcome> {
        let identity = match self.verifier.verify(username, password).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Failed login attempt for {:?}", username);
                return Err(e);
            }
        };

        let ttl = if identity.is_bootstrap() {
            self.policy.bootstrap_ttl
        } else {
            Duration::zero()
        };

        let public = identity.without_secret();
        let (token, expires_at) = self.sessions.open_session(identity, ttl).await?;

        info!("User {:?} logged in", public.username);

        Ok(LoginOutcome {
            token,
            identity: public,
            expires_at,
        })
    }

    /// End the session named by the request
    pub async fn logout(&self, headers: &HeaderMap) -> AuthResult<()> {
        let token =
            session_token_from_headers(headers).ok_or(AuthError::SessionExpiredOrMissing)?;

        self.sessions.remove_session(&token).await;
        debug!("Session logged out");

        Ok(())
    }

    /// Drop every session of `username`.
    ///
    /// Called by user management whenever a password, username or admin flag
    /// changes, or an account is deleted.
    pub async fn mass_logout(&self, username: &str) -> usize {
        let removed = self.sessions.remove_username(username).await;
        info!("Mass logout of {:?} removed {} sessions", username, removed);
        removed
    }

    /// Authorize a request by its headers
    pub async fn authenticate(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> AuthResult<AuthenticatedSession> {
        let token = session_token_from_headers(headers);
        self.authenticate_token(token.as_deref(), method, path).await
    }

    /// Authorize a request carrying `token`.
    ///
    /// Sessions closer to expiry than the renewal threshold are extended by
    /// the default TTL, so a session in active use never lapses. Bootstrap
    /// sessions are never renewed and end at their fixed expiry.
    pub async fn authenticate_token(
        &self,
        token: Option<&str>,
        method: &Method,
        path: &str,
    ) -> AuthResult<AuthenticatedSession> {
        let token = token.ok_or(AuthError::SessionExpiredOrMissing)?;

        let entry = self
            .sessions
            .get_session(token)
            .await
            .ok_or(AuthError::SessionExpiredOrMissing)?;

        if let Some(rule) = &self.rule {
            if !rule(&entry.identity, method, path) {
                warn!(
                    "User {:?} denied {} {}",
                    entry.identity.username, method, path
                );
                return Err(AuthError::PermissionDenied);
            }
        }

        let mut expires_at = entry.expires_at;
        if !entry.identity.is_bootstrap()
            && expires_at - self.sessions.now() < self.policy.renew_threshold
        {
            if let Some(renewed) = self.sessions.prolong_session(token, Duration::zero()).await {
                debug!(
                    "Renewed session of {:?} until {}",
                    entry.identity.username, renewed
                );
                expires_at = renewed;
            }
        }

        Ok(AuthenticatedSession {
            token: token.to_string(),
            identity: entry.identity,
            expires_at,
        })
    }
}
