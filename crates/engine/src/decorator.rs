//! Decorator chain.
//!
//! Decorators transform the outgoing payload before it reaches the
//! channels. They run strictly sequentially (each sees the previous one's
//! output) and may consult the registry. A failing decorator abandons
//! dispatch for that (rule, event): no channel receives the payload.

use chrono::Utc;
use domopush_core::{DecoratorSpec, Payload, Rule};
use domopush_db::{Registry, RegistryError};

/// Error raised by a decorator.
#[derive(Debug, thiserror::Error)]
pub enum DecorateError {
    /// A registry read failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Apply one decorator to the payload, returning the transformed payload.
pub async fn apply(
    spec: &DecoratorSpec,
    rule: &Rule,
    registry: &dyn Registry,
    mut payload: Payload,
) -> Result<Payload, DecorateError> {
    match spec {
        DecoratorSpec::Timestamp => {
            payload.insert("at".into(), Utc::now().to_rfc3339().into());
        }
        DecoratorSpec::Set { fields } => {
            for (key, value) in fields {
                payload.insert(key.clone(), value.clone());
            }
        }
        DecoratorSpec::RecipientCount { provider } => {
            let count = registry.count_clients(provider, &rule.id).await?;
            payload.insert("recipients".into(), count.into());
        }
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domopush_db::models::Client;

    fn rule(id: &str) -> Rule {
        serde_json::from_str(&format!(r#"{{"id": "{id}"}}"#)).expect("rule parses")
    }

    /// Registry stub with a fixed client count.
    struct CountingRegistry(i64);

    #[async_trait]
    impl Registry for CountingRegistry {
        async fn list_clients(&self, _: &str, _: &str) -> Result<Vec<Client>, RegistryError> {
            Ok(Vec::new())
        }
        async fn count_clients(&self, _: &str, _: &str) -> Result<i64, RegistryError> {
            Ok(self.0)
        }
        async fn register_client(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<(), RegistryError> {
            Ok(())
        }
        async fn update_token(&self, _: &Client, _: &str) -> Result<(), RegistryError> {
            Ok(())
        }
        async fn record_success(&self, _: &Client) -> Result<(), RegistryError> {
            Ok(())
        }
        async fn record_error(&self, _: &Client, _: &str) -> Result<(), RegistryError> {
            Ok(())
        }
        async fn unregister(&self, _: &Client) -> Result<(), RegistryError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn timestamp_decorator_stamps_at_field() {
        let registry = CountingRegistry(0);
        let payload = apply(&DecoratorSpec::Timestamp, &rule("r1"), &registry, Payload::new())
            .await
            .expect("decorate");

        let at = payload.get("at").and_then(|v| v.as_str()).expect("at field set");
        assert!(at.contains('T'), "expected an RFC 3339 timestamp, got {at}");
    }

    #[tokio::test]
    async fn set_decorator_merges_fields_over_existing() {
        let mut fields = Payload::new();
        fields.insert("severity".into(), "high".into());
        fields.insert("device".into(), "overridden".into());

        let mut payload = Payload::new();
        payload.insert("device".into(), "kitchen".into());

        let registry = CountingRegistry(0);
        let payload = apply(&DecoratorSpec::Set { fields }, &rule("r1"), &registry, payload)
            .await
            .expect("decorate");

        assert_eq!(payload["severity"], "high");
        assert_eq!(payload["device"], "overridden");
    }

    #[tokio::test]
    async fn recipient_count_decorator_consults_the_registry() {
        let registry = CountingRegistry(3);
        let spec = DecoratorSpec::RecipientCount {
            provider: "gcm".into(),
        };
        let payload = apply(&spec, &rule("r1"), &registry, Payload::new())
            .await
            .expect("decorate");

        assert_eq!(payload["recipients"], 3);
    }
}
