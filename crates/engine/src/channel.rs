//! Rate-limited batching channel.
//!
//! One [`Channel`] exists per (rule, provider) pair for the process
//! lifetime; every payload produced for that pair funnels through its queue,
//! which is what makes batching possible. The channel decouples
//! arbitrarily-frequent enqueues from the provider's rate ceiling: all
//! payloads received within a flush window go out as one provider call, and
//! consecutive calls are spaced by at least the configured rate limit.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use domopush_core::{Payload, Rule};
use tokio::time::Instant;

use crate::provider::PushProvider;

/// Floor for the re-arm delay when a flush ran longer than the rate limit.
const MIN_FLUSH_DELAY: Duration = Duration::from_millis(5);

/// Queue and timer state, guarded by one mutex so the enqueue path and the
/// flush path's swap-and-clear are serialized.
struct ChannelState {
    pending: Vec<Payload>,
    timer_armed: bool,
}

/// Batching channel bound to exactly one (rule, provider) pair.
pub struct Channel {
    rule: Arc<Rule>,
    provider: Arc<dyn PushProvider>,
    rate_limit: Duration,
    state: Mutex<ChannelState>,
}

impl Channel {
    /// Create the channel for `rule` on `provider`.
    ///
    /// The effective rate limit is the rule's per-provider override when
    /// present, else the provider default.
    pub fn new(rule: Arc<Rule>, provider: Arc<dyn PushProvider>) -> Arc<Self> {
        let override_ms = match provider.name() {
            "gcm" => rule.gcm.as_ref().and_then(|c| c.rate_limit_ms),
            "wns" => rule.wns.as_ref().and_then(|c| c.rate_limit_ms),
            _ => None,
        };
        let rate_limit = override_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| provider.default_rate_limit());

        Arc::new(Self {
            rule,
            provider,
            rate_limit,
            state: Mutex::new(ChannelState {
                pending: Vec::new(),
                timer_armed: false,
            }),
        })
    }

    /// Rule this channel is bound to.
    pub fn rule_id(&self) -> &str {
        &self.rule.id
    }

    /// Provider this channel dispatches to.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Append a payload to the pending queue and return immediately.
    ///
    /// If no flush timer is armed, arms one firing after `rate_limit / 2`.
    /// If a timer is already armed the payload simply accumulates.
    pub fn enqueue(self: Arc<Self>, payload: Payload) {
        let arm = {
            let mut state = self.state.lock().expect("channel state poisoned");
            state.pending.push(payload);
            if state.timer_armed {
                false
            } else {
                state.timer_armed = true;
                true
            }
        };

        if arm {
            tracing::debug!(
                rule = %self.rule.id,
                provider = self.provider.name(),
                "Arming flush timer"
            );
            tokio::spawn(async move { self.flush_loop().await });
        }
    }

    /// Timer-driven flush loop: one run per armed timer.
    ///
    /// Fires first after `rate_limit / 2`, then keeps flushing as long as
    /// the queue refills during flight, spacing provider calls by
    /// `max(rate_limit - elapsed, MIN_FLUSH_DELAY)`. Disarms and exits once
    /// a flush completes with an empty queue.
    async fn flush_loop(&self) {
        tokio::time::sleep(self.rate_limit / 2).await;

        loop {
            let batch = {
                let mut state = self.state.lock().expect("channel state poisoned");
                std::mem::take(&mut state.pending)
            };

            let started = Instant::now();
            if let Err(e) = self.provider.send_batch(&self.rule, &batch).await {
                // A failed flush never stops the state machine.
                tracing::error!(
                    rule = %self.rule.id,
                    provider = self.provider.name(),
                    error = %e,
                    "Batch send failed"
                );
            }
            let elapsed = started.elapsed();

            {
                let mut state = self.state.lock().expect("channel state poisoned");
                if state.pending.is_empty() {
                    state.timer_armed = false;
                    return;
                }
            }

            let delay = self.rate_limit.saturating_sub(elapsed).max(MIN_FLUSH_DELAY);
            tracing::debug!(
                rule = %self.rule.id,
                provider = self.provider.name(),
                delay_ms = delay.as_millis() as u64,
                "Queue refilled during flush, re-arming"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
