//! Dispatch coordinator.
//!
//! Per inbound event, every rule runs independently: its filter chain, its
//! decorator chain, then fan-out to the channels bound to the rule. A
//! failure inside one rule's chain is logged and never affects sibling
//! rules or later events.

use std::collections::HashMap;
use std::sync::Arc;

use domopush_core::event::SENSOR_BASIC;
use domopush_core::{Rule, SensorEvent};
use domopush_db::Registry;
use tokio::sync::broadcast;

use crate::channel::Channel;
use crate::provider::{GcmProvider, PushProvider, WnsProvider};
use crate::{decorator, filter};

/// Ambient context the coordinator supplies to filter evaluation.
#[derive(Debug, Default)]
pub struct DispatchContext {
    device_aliases: HashMap<String, String>,
}

impl DispatchContext {
    pub fn new(device_aliases: HashMap<String, String>) -> Self {
        Self { device_aliases }
    }

    /// Substitute a device name through the alias table, if mapped.
    pub fn resolve_alias<'a>(&'a self, device: &'a str) -> &'a str {
        self.device_aliases
            .get(device)
            .map(String::as_str)
            .unwrap_or(device)
    }
}

/// Channels keyed by (rule id, provider name).
pub type ChannelMap = HashMap<(String, String), Arc<Channel>>;

/// Build the channel singletons for every provider block of every rule.
///
/// Called once at startup; the channels live for the process lifetime and
/// all payloads for a (rule, provider) pair funnel through the same one.
pub fn build_channels(rules: &[Arc<Rule>], registry: Arc<dyn Registry>) -> ChannelMap {
    let mut channels = ChannelMap::new();

    for rule in rules {
        if rule.gcm.is_some() {
            let provider: Arc<dyn PushProvider> = Arc::new(GcmProvider::new(Arc::clone(&registry)));
            channels.insert(
                (rule.id.clone(), provider.name().to_string()),
                Channel::new(Arc::clone(rule), provider),
            );
        }
        if rule.wns.is_some() {
            let provider: Arc<dyn PushProvider> = Arc::new(WnsProvider::new());
            channels.insert(
                (rule.id.clone(), provider.name().to_string()),
                Channel::new(Arc::clone(rule), provider),
            );
        }
    }

    tracing::info!(channels = channels.len(), "Built dispatch channels");
    channels
}

/// The dispatch coordinator: owns the loaded rules and their channels.
pub struct Dispatcher {
    rules: Vec<Arc<Rule>>,
    channels: ChannelMap,
    registry: Arc<dyn Registry>,
    ctx: DispatchContext,
}

impl Dispatcher {
    pub fn new(
        rules: Vec<Arc<Rule>>,
        channels: ChannelMap,
        registry: Arc<dyn Registry>,
        ctx: DispatchContext,
    ) -> Self {
        Self {
            rules,
            channels,
            registry,
            ctx,
        }
    }

    /// Consume the bus until it closes.
    ///
    /// Lagged receivers log a warning and keep going; only the relevant
    /// schema is processed, everything else is skipped.
    pub async fn run(&self, mut rx: broadcast::Receiver<SensorEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if event.schema != SENSOR_BASIC {
                        tracing::trace!(schema = %event.schema, "Ignoring event schema");
                        continue;
                    }
                    self.dispatch(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Dispatcher lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, dispatcher stopping");
                    return;
                }
            }
        }
    }

    /// Process one event through every rule, rules running concurrently.
    pub async fn dispatch(&self, event: SensorEvent) {
        tracing::debug!(
            device = event.device().unwrap_or("-"),
            sensor_type = event.sensor_type().unwrap_or("-"),
            "Dispatching event"
        );

        futures::future::join_all(
            self.rules
                .iter()
                .map(|rule| self.process_rule(rule, &event)),
        )
        .await;
    }

    /// Run one rule's chains for one event.
    async fn process_rule(&self, rule: &Arc<Rule>, event: &SensorEvent) {
        // Filters: strictly sequential, short-circuit on false or error.
        for spec in &rule.filters {
            match filter::evaluate(spec, event, &self.ctx) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(rule = %rule.id, "Filter rejected event");
                    return;
                }
                Err(e) => {
                    tracing::warn!(rule = %rule.id, error = %e, "Filter failed, rejecting event");
                    return;
                }
            }
        }

        // Decorators: strictly sequential over a copy of the event body.
        let mut payload = event.body.clone();
        for spec in &rule.decorators {
            payload = match decorator::apply(spec, rule, self.registry.as_ref(), payload).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(rule = %rule.id, error = %e, "Decorator failed, abandoning dispatch");
                    return;
                }
            };
        }

        // Fan-out to every channel bound to this rule.
        for ((rule_id, provider), channel) in &self.channels {
            if rule_id == &rule.id {
                tracing::debug!(rule = %rule.id, provider = %provider, "Enqueueing payload");
                Arc::clone(channel).enqueue(payload.clone());
            }
        }
    }
}
