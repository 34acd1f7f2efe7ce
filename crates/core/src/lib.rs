//! Domopush domain model.
//!
//! This crate holds the types shared across the relay:
//!
//! - [`SensorEvent`]: the inbound sensor notification envelope.
//! - [`Rule`]: a dispatch rule with its filter chain, decorator chain,
//!   and per-provider configuration.
//! - [`config`]: rule-file loading, including the auxiliary content
//!   (device lists) referenced by filters.
//! - [`ConfigError`]: the configuration error taxonomy.

pub mod config;
pub mod error;
pub mod event;
pub mod rule;
pub mod types;

pub use config::{load_rules, parse_device_aliases};
pub use error::ConfigError;
pub use event::{EventKind, Payload, SensorEvent};
pub use rule::{DecoratorSpec, DeviceList, FilterSpec, GcmConfig, Rule, WnsConfig};
