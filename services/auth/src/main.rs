use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ledger_auth::{
    AppState, Authenticator, CredentialVerifier, SessionStore, SessionSweeper,
    repositories::{IdentityStore, PgIdentityStore},
    routes,
    settings::SessionSettings,
};
use ledger_common::database::{DatabaseConfig, health_check, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting session authentication service");

    let settings = SessionSettings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let identities = Arc::new(PgIdentityStore::new(pool));
    if identities.count_identities().await? == 0 {
        warn!("No identities registered yet: any login will open a bootstrap session");
    }

    let sessions = Arc::new(SessionStore::new(settings.default_ttl()));
    let authenticator = Authenticator::new(
        CredentialVerifier::new(identities),
        sessions.clone(),
        settings.session_policy(),
    )
    .with_rule(settings.access_policy().into_rule());

    let sweeper = SessionSweeper::start(sessions, settings.sweep_interval()).await?;

    // Start the web server
    let app = routes::create_router(AppState::new(authenticator));

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("Session authentication service listening on {}", settings.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await?;
    info!("Session authentication service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
