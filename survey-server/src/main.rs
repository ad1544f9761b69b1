//! Retailer Survey Server

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use survey_core::Wizard;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use survey_server::{routes, AdminCredentials, AppState, Config, SessionStore, SqliteStore};

/// How often idle sessions are purged
const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    // Open the database, creating its directory on first run
    if config.database_path != ":memory:" {
        if let Some(parent) = Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    tracing::info!(path = %config.database_path, "Opened database");

    let admin = AdminCredentials::new(&config.admin_user, &config.admin_pass)?;

    // One SQLite store backs both sessions and responses
    let state = Arc::new(AppState::new(
        Wizard::new(config.variant),
        admin,
        store.clone(),
        store.clone(),
    ));

    // Purge idle sessions in the background
    let ttl = config.session_ttl_minutes;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match store.cleanup_expired(ttl) {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
                Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
            }
        }
    });

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(variant = config.variant.as_str(), "Survey listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
