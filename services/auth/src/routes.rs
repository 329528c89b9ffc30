//! HTTP surface of the session-authentication service

use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    authenticator::SESSION_COOKIE,
    error::AuthError,
    middleware::require_session,
    models::{AuthenticatedSession, Identity, LoginCredentials},
    state::AppState,
};

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub session: String,
    /// Seconds until the session lapses unless renewed
    pub expires_in: i64,
    /// Absent for bootstrap sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Identity>,
}

/// Response describing the caller's own session
#[derive(Serialize)]
pub struct SessionResponse {
    pub account: Identity,
    pub expires_at: DateTime<Utc>,
}

/// Create the router for the session-authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "ledger-auth"
    }))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let outcome = state
        .authenticator
        .login(&payload.username, &payload.password)
        .await?;

    let now = state.authenticator.sessions().now();
    let account = if outcome.identity.is_bootstrap() {
        None
    } else {
        Some(outcome.identity)
    };

    let cookie = Cookie::build((SESSION_COOKIE, outcome.token.clone()))
        .path("/")
        .http_only(true);

    let response = LoginResponse {
        session: outcome.token,
        expires_in: (outcome.expires_at - now).num_seconds(),
        account,
    };

    Ok((StatusCode::OK, jar.add(cookie), Json(response)))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    state.authenticator.logout(&headers).await?;

    Ok((
        StatusCode::OK,
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Identity snapshot held by the caller's session
pub async fn current_session(
    Extension(session): Extension<AuthenticatedSession>,
) -> impl IntoResponse {
    Json(SessionResponse {
        account: session.identity.without_secret(),
        expires_at: session.expires_at,
    })
}
