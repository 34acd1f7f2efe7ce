//! Handler for the event ingestion endpoint.
//!
//! Stands in for an external bus binding: accepted events are published to
//! the in-process bus and picked up by the dispatcher asynchronously.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domopush_core::SensorEvent;

use crate::state::AppState;

/// POST /api/v1/events
///
/// Publish an inbound sensor event to the dispatch bus. Returns 202: the
/// event is accepted for processing, not yet dispatched.
pub async fn ingest_event(
    State(state): State<AppState>,
    Json(event): Json<SensorEvent>,
) -> impl IntoResponse {
    tracing::debug!(
        schema = %event.schema,
        device = event.device().unwrap_or("-"),
        "Ingesting event"
    );
    state.bus.publish(event);
    StatusCode::ACCEPTED
}
