//! Session guard for protected routes

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{error::AuthError, state::AppState};

/// Reject the request unless it carries a session allowed to reach this
/// route. On success the [`AuthenticatedSession`](crate::models::AuthenticatedSession)
/// is stored in the request extensions for handlers to pick up.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let session = state
        .authenticator
        .authenticate(req.method(), req.uri().path(), req.headers())
        .await?;

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
