use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
///
/// Covers the three things the relay needs to function: a reachable
/// registry database, loaded rules, and a dispatcher draining the bus.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the registry is reachable and a dispatcher is attached,
    /// `"degraded"` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the registry database answers.
    pub db_healthy: bool,
    /// Number of loaded dispatch rules.
    pub rules: usize,
    /// Whether anything is subscribed to the event bus. False means
    /// ingested events are being dropped.
    pub dispatcher_attached: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = domopush_db::health_check(&state.pool).await.is_ok();
    let dispatcher_attached = state.bus.subscriber_count() > 0;

    let status = if db_healthy && dispatcher_attached {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        rules: state.rules.len(),
        dispatcher_attached,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
