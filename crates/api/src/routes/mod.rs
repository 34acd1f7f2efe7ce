pub mod health;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /rules/{rule_id}/register    register a device push token (POST)
/// /events                      publish an inbound sensor event (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules/{rule_id}/register",
            post(handlers::register::register_device),
        )
        .route("/events", post(handlers::ingest::ingest_event))
}
