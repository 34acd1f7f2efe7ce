//! WNS no-op stub.
//!
//! Registrations from Windows devices land under the `"wns"` provider key,
//! but no sender is implemented: batches are logged and discarded. The stub
//! keeps the channel contract so a real adapter can slot in later.

use std::time::Duration;

use async_trait::async_trait;
use domopush_core::{Payload, Rule};

use super::{PushProvider, SendError};

/// Default spacing between (discarded) batch sends.
const WNS_RATE_LIMIT: Duration = Duration::from_millis(250);

/// Stub WNS sender.
#[derive(Debug, Default)]
pub struct WnsProvider;

impl WnsProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushProvider for WnsProvider {
    fn name(&self) -> &'static str {
        "wns"
    }

    fn default_rate_limit(&self) -> Duration {
        WNS_RATE_LIMIT
    }

    async fn send_batch(&self, rule: &Rule, payloads: &[Payload]) -> Result<(), SendError> {
        tracing::debug!(
            rule = %rule.id,
            messages = payloads.len(),
            "WNS delivery is not implemented, dropping batch"
        );
        Ok(())
    }
}
