//! Collection Ledger - API Server Binary
//!
//! This binary starts the HTTP API server for the collection ledger.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory store
//! cargo run --bin collection-api
//!
//! # Run against PostgreSQL
//! API_STORE=postgres API_DATABASE_URL=postgres://... cargo run --bin collection-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` / `PORT` - Server port (default: 5050)
//! * `API_STORE` - Document store: memory or postgres (default: memory)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_TIMEZONE` - Reporting timezone (default: Asia/Kolkata)
//! * `API_MAX_UPDATE_ATTEMPTS` - Optimistic retry budget per update (default: 25)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_ledger::ports::memory::InMemoryDocumentStore;
use domain_ledger::{DocumentStore, LedgerService};
use infra_db::{create_pool_from_url, run_migrations, PostgresDocumentStore};
use interface_api::config::{platform_port, ApiConfig, StoreKind};
use interface_api::create_router;

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the document store,
/// and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - The configured timezone is unknown
/// - Database connection or migrations fail
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        store = ?config.store,
        timezone = %config.timezone,
        "Starting Collection Ledger API Server"
    );

    let timezone = config
        .reporting_timezone()
        .context("invalid API_TIMEZONE")?;

    let store = open_store(&config).await?;
    let service = LedgerService::new(store, Arc::new(SystemClock), timezone)
        .with_max_attempts(config.max_update_attempts);

    let app = create_router(service, config.clone());

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

/// Loads API configuration from environment variables.
///
/// Falls back to reading each variable individually if the `API_*` set
/// cannot be deserialized as a whole.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Falling back to per-variable configuration: {}", e);
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(platform_port),
            store: match std::env::var("API_STORE").as_deref() {
                Ok("postgres") => StoreKind::Postgres,
                _ => StoreKind::Memory,
            },
            database_url: std::env::var("API_DATABASE_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            timezone: std::env::var("API_TIMEZONE").unwrap_or(defaults.timezone),
            max_update_attempts: std::env::var("API_MAX_UPDATE_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_update_attempts),
            log_level: std::env::var("API_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens the configured document store, migrating the database if needed.
async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; ledgers are lost on restart");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreKind::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = create_pool_from_url(&config.database_url)
                .await
                .context("connecting to the document database")?;
            run_migrations(&pool)
                .await
                .context("applying document store migrations")?;
            Ok(Arc::new(PostgresDocumentStore::new(pool)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
