//! HTTP API Layer
//!
//! This crate exposes the collection ledger over HTTP using Axum. Route paths
//! match the ones the field agents' mobile app already calls.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers grouped by ledger operation
//! - **Middleware**: Tracing, request ids, request logging
//! - **DTOs**: camelCase request/response bodies with `validator` rules
//! - **Error Handling**: `LedgerError` mapped onto consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_ledger::LedgerService;

use crate::config::ApiConfig;
use crate::handlers::{auth, batch, clients, entries, health, reports};
use crate::middleware::request_logging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: LedgerService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Ledger service over the configured document store
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: LedgerService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    let health_routes = Router::new()
        .route("/", get(health::banner))
        .route("/healthz", get(health::health_check))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let report_routes = Router::new()
        .route("/dashboard", get(reports::dashboard))
        .route("/weekly", get(reports::weekly))
        .route("/today", get(reports::today));

    let ledger_routes = Router::new()
        .route("/nextClientId", get(clients::next_client_id))
        .route("/addNewClient", post(clients::add_client))
        .route("/addEntry", post(entries::add_entry))
        .route("/today/batchMark", post(batch::batch_mark))
        .route("/today/undoLastBatch", post(batch::undo_last_batch));

    let auth_routes = Router::new().route("/auth/resolveUser", get(auth::resolve_user));

    Router::new()
        .merge(health_routes)
        .merge(report_routes)
        .merge(ledger_routes)
        .merge(auth_routes)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
