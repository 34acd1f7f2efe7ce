//! Inbound sensor event envelope.

use serde::{Deserialize, Serialize};

/// Body attributes of an event or an outgoing payload.
///
/// A shallow map of named attributes; at minimum `device`, `type`, and the
/// value fields (e.g. `current`). The dispatch pipeline copies the body of
/// an accepted event and mutates the copy through the decorator chain.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Category of an inbound message.
///
/// Triggers report a state change, statuses report a periodic reading. The
/// coordinator processes both; command-style traffic never reaches the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Trigger,
    Status,
}

/// One inbound sensor notification. Transient, one per bus message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Message category.
    pub kind: EventKind,

    /// Message schema, e.g. `"sensor.basic"`. The dispatcher only
    /// processes [`SENSOR_BASIC`](crate::event::SENSOR_BASIC) events.
    pub schema: String,

    /// Named body attributes (`device`, `type`, `current`, ...).
    pub body: Payload,
}

/// The only schema the dispatcher acts on.
pub const SENSOR_BASIC: &str = "sensor.basic";

impl SensorEvent {
    /// Create a trigger event with the given schema and body.
    pub fn trigger(schema: impl Into<String>, body: Payload) -> Self {
        Self {
            kind: EventKind::Trigger,
            schema: schema.into(),
            body,
        }
    }

    /// The `device` body attribute, if present and a string.
    pub fn device(&self) -> Option<&str> {
        self.body.get("device").and_then(|v| v.as_str())
    }

    /// The `type` body attribute, if present and a string.
    pub fn sensor_type(&self) -> Option<&str> {
        self.body.get("type").and_then(|v| v.as_str())
    }
}
