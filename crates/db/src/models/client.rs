//! Registered push client entity model.

use domopush_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `clients` table.
///
/// One record per (provider, rule, device); holds the device's current push
/// token for that provider. Owned and mutated only by the registry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    /// Provider name, e.g. `"gcm"` or `"wns"`.
    pub provider: String,
    /// Rule the device registered for.
    pub rule_id: String,
    /// Stable device identifier supplied at registration.
    pub device_id: String,
    /// Provider-specific delivery address.
    pub push_token: String,
    /// Last registration or token-rotation time.
    pub updated_at: Timestamp,
}
