//! Provider adapters: batch senders for one push provider each.

pub mod gcm;
pub mod wns;

use async_trait::async_trait;
use domopush_core::{Payload, Rule};
use domopush_db::RegistryError;
use std::time::Duration;

pub use gcm::GcmProvider;
pub use wns::WnsProvider;

/// Error raised by a batch send.
///
/// A non-success provider HTTP status is *not* an error: the batch is
/// logged and treated as handled, with no retry.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Network-level failure talking to the provider.
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response result list does not positionally match the client
    /// list the request was built from. Failing here prevents
    /// mis-attributing results to the wrong clients.
    #[error("Response carries {actual} results for {expected} clients")]
    Reconciliation { expected: usize, actual: usize },

    /// A registry read or mutation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The batch payload could not be serialized.
    #[error("Cannot encode batch payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A push provider: builds and sends one batched request per flush.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Provider name, also the registry channel key (e.g. `"gcm"`).
    fn name(&self) -> &'static str;

    /// Rate limit applied when the rule does not override it.
    fn default_rate_limit(&self) -> Duration;

    /// Send all `payloads` accumulated since the previous flush as one
    /// batched call, and reconcile the per-recipient outcome against the
    /// registry. Payload order is enqueue order and must be preserved.
    async fn send_batch(&self, rule: &Rule, payloads: &[Payload]) -> Result<(), SendError>;
}
