//! Domopush event-dispatch pipeline.
//!
//! The building blocks, in data-flow order:
//!
//! - [`EventBus`]: in-process fan-out of inbound [`SensorEvent`]s.
//! - [`filter`]: rule-scoped predicates over inbound events.
//! - [`decorator`]: sequential transforms of the outgoing payload.
//! - [`Channel`]: per-(rule, provider) rate-limited batching.
//! - [`provider`]: batch senders, the GCM HTTP adapter and the WNS stub.
//! - [`Dispatcher`]: the coordinator running the rule loop per event.
//!
//! [`SensorEvent`]: domopush_core::SensorEvent

pub mod bus;
pub mod channel;
pub mod decorator;
pub mod dispatch;
pub mod filter;
pub mod provider;

pub use bus::EventBus;
pub use channel::Channel;
pub use dispatch::{build_channels, DispatchContext, Dispatcher};
pub use provider::{GcmProvider, PushProvider, SendError, WnsProvider};
