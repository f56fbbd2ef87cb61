//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::dto::BannerResponse;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub timezone: String,
    pub latency_ms: u64,
}

/// Liveness banner on `/`
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        status: "ok",
        msg: "Api is Live",
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check (includes the document store)
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, StatusCode> {
    let health = state.service.health_check().await;

    if !health.is_healthy() {
        warn!(
            store = %health.adapter_id,
            message = health.message.as_deref().unwrap_or(""),
            "Document store not ready"
        );
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: health.adapter_id,
        timezone: state.config.timezone.clone(),
        latency_ms: health.latency_ms,
    }))
}
