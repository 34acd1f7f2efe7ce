//! Dispatch rules: filter specs, decorator specs, and provider configuration.
//!
//! Rules are loaded once at startup (see [`crate::config::load_rules`]) and
//! are immutable afterwards. Filter and decorator kinds form a static
//! registry: an unknown `kind` tag fails deserialization, so a bad rule file
//! is rejected before the engine ever starts.

use std::collections::HashMap;

use serde::Deserialize;

use crate::event::Payload;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// One dispatch rule.
///
/// An inbound event passes the ordered filter chain, the body copy is run
/// through the ordered decorator chain, and the result is enqueued to every
/// channel built from the configured provider blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// Rule identifier, also the registration-route segment.
    pub id: String,

    /// Ordered filter chain; short-circuits on the first rejection.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,

    /// Ordered decorator chain; each decorator sees the previous output.
    #[serde(default)]
    pub decorators: Vec<DecoratorSpec>,

    /// GCM provider configuration, if this rule pushes via GCM.
    #[serde(default)]
    pub gcm: Option<GcmConfig>,

    /// WNS provider configuration (delivery is a no-op stub).
    #[serde(default)]
    pub wns: Option<WnsConfig>,
}

// ---------------------------------------------------------------------------
// Provider configuration
// ---------------------------------------------------------------------------

/// GCM provider block of a rule.
#[derive(Debug, Clone, Deserialize)]
pub struct GcmConfig {
    /// API key sent as the `Authorization` header of each batch request.
    pub api_key: String,

    /// Optional routing restriction forwarded verbatim in the request.
    #[serde(default)]
    pub restricted_package_name: Option<String>,

    /// Per-rule override of the channel rate limit, in milliseconds.
    #[serde(default)]
    pub rate_limit_ms: Option<u64>,
}

/// WNS provider block of a rule. Same shape as [`GcmConfig`]; the WNS
/// adapter itself is a no-op stub.
#[derive(Debug, Clone, Deserialize)]
pub struct WnsConfig {
    pub api_key: String,

    #[serde(default)]
    pub rate_limit_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// A filter spec: predicate kind plus kind-specific parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterSpec {
    /// Accept iff the event `type` attribute is non-empty and in the set.
    Type {
        #[serde(rename = "in")]
        allowed: Vec<String>,
    },

    /// Accept iff the event `device` attribute (after alias substitution)
    /// is listed, directly or inside a named group, in the content loaded
    /// from `path` at startup.
    DeviceInList {
        /// Path to the device-list file, relative to the rule file.
        path: String,

        /// Content loaded at startup; never present in the rule file.
        #[serde(skip)]
        content: Option<DeviceList>,
    },
}

/// Loaded content of a `device-in-list` filter.
///
/// A map whose values are either a device name, or a one-level group object
/// whose *keys* are device names.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceList(pub HashMap<String, DeviceEntry>);

/// One entry of a [`DeviceList`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DeviceEntry {
    /// A single device name.
    Device(String),

    /// A named group; the map keys are the device names.
    Group(HashMap<String, serde_json::Value>),
}

impl DeviceList {
    /// Whether `device` appears in the list, directly or in a group.
    pub fn contains(&self, device: &str) -> bool {
        self.0.values().any(|entry| match entry {
            DeviceEntry::Device(name) => name == device,
            DeviceEntry::Group(members) => members.contains_key(device),
        })
    }
}

// ---------------------------------------------------------------------------
// Decorators
// ---------------------------------------------------------------------------

/// A decorator spec: transform kind plus kind-specific parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DecoratorSpec {
    /// Stamp the payload with an `at` RFC 3339 timestamp.
    Timestamp,

    /// Merge configured static fields into the payload.
    Set { fields: Payload },

    /// Stamp the payload with the number of clients registered for the
    /// given provider on this rule, as `recipients`.
    RecipientCount { provider: String },
}
