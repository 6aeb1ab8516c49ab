//! Claims Platform - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, default configuration
//! cargo run --bin claims-api
//!
//! # PostgreSQL store
//! API_DATABASE_URL=postgres://localhost/claims API_JWT_SECRET=... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - HS256 secret shared with the login service (required in production)
//! * `API_JWT_LEEWAY_SECS` - Tolerated clock skew for token expiry (default: 0)
//! * `API_DATABASE_URL` - PostgreSQL connection string; unset means in-memory storage
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_REVIEW_THRESHOLD` - Default review-queue fraud threshold (default: 0.6)
//! * `API_REVIEW_QUEUE_LIMIT` / `API_REVIEW_QUEUE_MAX_LIMIT` - Queue sizes (default: 50 / 200)
//! * `API_UNSCORED_RISK_SCORE` / `API_UNSCORED_FRAUD_SCORE` - Scores for unscored claims (default: 0.0)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_claims::{ClaimStore, InMemoryClaimStore};
use infra_db::{create_pool_from_url, run_migrations, PgClaimStore};
use interface_api::{config::ApiConfig, create_router, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the claim store, and
/// starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("loading API configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        review_threshold = config.review_threshold,
        "Starting claims API server"
    );
    if config.uses_default_secret() {
        tracing::warn!("API_JWT_SECRET is not set; using the development placeholder secret");
    }

    let store = open_store(&config).await?;
    let state = AppState::new(config.clone(), store, Arc::new(SystemClock))
        .context("building application state")?;
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens PostgreSQL when a URL is configured, otherwise an in-memory store.
async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn ClaimStore>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool_from_url(url)
                .await
                .context("connecting to database")?;
            run_migrations(&pool).await.context("running migrations")?;
            Ok(Arc::new(PgClaimStore::new(pool)))
        }
        None => {
            tracing::warn!("API_DATABASE_URL is not set; claims are kept in memory and lost on exit");
            Ok(Arc::new(InMemoryClaimStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
