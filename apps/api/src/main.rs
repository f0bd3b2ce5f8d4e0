use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_ai::ai::{build_service, CredentialStore};
use resume_ai::config::Config;
use resume_ai::interview::sessions::SessionStore;
use resume_ai::routes::build_router;
use resume_ai::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "resume_ai={level},resume_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Credentials: seeded from the environment, replaceable at runtime
    let credentials = CredentialStore::new(config.ai.active_api_key());
    if !credentials.is_configured() {
        warn!(
            "No API key configured for {}; AI calls will fail until one is set via PUT /api/v1/credentials",
            config.ai.provider.as_str()
        );
    }
    spawn_credential_watcher(&credentials);

    // Initialize the active AI adapter
    let ai = build_service(&config.ai, credentials.clone())?;

    // Chat sessions: idle ones are swept once a minute
    let sessions = SessionStore::with_limits(
        config.sessions.idle_timeout,
        config.sessions.max_sessions,
    );
    sessions.spawn_sweeper(Duration::from_secs(60));

    // Build app state
    let state = AppState::new(ai, credentials, sessions);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to APP_URL once the frontend is deployed alongside

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Warns when the key goes away, including the automatic clear after the
/// provider rejects it.
fn spawn_credential_watcher(credentials: &CredentialStore) {
    let mut rx = credentials.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().is_none() {
                warn!("No API key configured; set one via PUT /api/v1/credentials");
            }
        }
    });
}
