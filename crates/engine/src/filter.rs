//! Filter evaluation.
//!
//! A filter is a pure predicate over a rule-scoped spec and an inbound
//! event. Chains run strictly in declared order and short-circuit on the
//! first `false` or error; an error rejects the event for that rule only.

use domopush_core::{ConfigError, FilterSpec, SensorEvent};

use crate::dispatch::DispatchContext;

/// Evaluate one filter spec against an event.
pub fn evaluate(
    spec: &FilterSpec,
    event: &SensorEvent,
    ctx: &DispatchContext,
) -> Result<bool, ConfigError> {
    match spec {
        FilterSpec::Type { allowed } => Ok(matches_type(allowed, event)),
        FilterSpec::DeviceInList { path, content } => {
            let list = content.as_ref().ok_or_else(|| ConfigError::MissingContent {
                path: path.clone(),
            })?;

            let Some(device) = event.device() else {
                return Ok(false);
            };
            let device = ctx.resolve_alias(device);

            tracing::trace!(device, "Matching device against list");
            Ok(list.contains(device))
        }
    }
}

/// True iff the event's `type` attribute is non-empty and allowed.
fn matches_type(allowed: &[String], event: &SensorEvent) -> bool {
    match event.sensor_type() {
        Some(t) if !t.is_empty() => allowed.iter().any(|a| a == t),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use domopush_core::{event::SENSOR_BASIC, DeviceList, Payload};
    use std::collections::HashMap;

    fn event(device: &str, sensor_type: &str) -> SensorEvent {
        let mut body = Payload::new();
        body.insert("device".into(), device.into());
        body.insert("type".into(), sensor_type.into());
        SensorEvent::trigger(SENSOR_BASIC, body)
    }

    fn type_filter(allowed: &[&str]) -> FilterSpec {
        FilterSpec::Type {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn device_filter(devices: &str) -> FilterSpec {
        let content: DeviceList = serde_json::from_str(devices).expect("valid device list");
        FilterSpec::DeviceInList {
            path: "devices.json".into(),
            content: Some(content),
        }
    }

    fn ctx() -> DispatchContext {
        DispatchContext::default()
    }

    #[test]
    fn type_filter_accepts_listed_type() {
        let spec = type_filter(&["motion", "contact"]);
        assert!(evaluate(&spec, &event("kitchen", "motion"), &ctx()).unwrap());
    }

    #[test]
    fn type_filter_rejects_unlisted_or_missing_type() {
        let spec = type_filter(&["motion"]);
        assert!(!evaluate(&spec, &event("kitchen", "temperature"), &ctx()).unwrap());
        assert!(!evaluate(&spec, &event("kitchen", ""), &ctx()).unwrap());

        let no_type = SensorEvent::trigger(SENSOR_BASIC, Payload::new());
        assert!(!evaluate(&spec, &no_type, &ctx()).unwrap());
    }

    #[test]
    fn device_filter_matches_direct_and_group_members() {
        let spec = device_filter(r#"{"a": "kitchen", "floor": {"hall": 1}}"#);
        assert!(evaluate(&spec, &event("kitchen", "motion"), &ctx()).unwrap());
        assert!(evaluate(&spec, &event("hall", "motion"), &ctx()).unwrap());
        assert!(!evaluate(&spec, &event("garage", "motion"), &ctx()).unwrap());
    }

    #[test]
    fn device_filter_applies_alias_substitution() {
        let spec = device_filter(r#"{"a": "kitchen"}"#);
        let mut aliases = HashMap::new();
        aliases.insert("sensor12".to_string(), "kitchen".to_string());
        let ctx = DispatchContext::new(aliases);

        assert!(evaluate(&spec, &event("sensor12", "motion"), &ctx).unwrap());
        assert!(!evaluate(&spec, &event("sensor99", "motion"), &ctx).unwrap());
    }

    #[test]
    fn device_filter_without_content_is_a_configuration_error() {
        let spec = FilterSpec::DeviceInList {
            path: "devices.json".into(),
            content: None,
        };
        let err = evaluate(&spec, &event("kitchen", "motion"), &ctx()).unwrap_err();
        assert_matches!(err, ConfigError::MissingContent { path } if path == "devices.json");
    }

    #[test]
    fn device_filter_rejects_event_without_device() {
        let spec = device_filter(r#"{"a": "kitchen"}"#);
        let no_device = SensorEvent::trigger(SENSOR_BASIC, Payload::new());
        assert!(!evaluate(&spec, &no_device, &ctx()).unwrap());
    }
}
