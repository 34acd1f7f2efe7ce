use std::sync::Arc;

use domopush_core::Rule;
use domopush_db::Registry;
use domopush_engine::EventBus;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: domopush_db::DbPool,
    /// Client registry (registration endpoint writes through this).
    pub registry: Arc<dyn Registry>,
    /// Loaded dispatch rules; registration routes validate against them.
    pub rules: Arc<Vec<Arc<Rule>>>,
    /// Event bus the ingestion endpoint publishes to.
    pub bus: Arc<EventBus>,
}
