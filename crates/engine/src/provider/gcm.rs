//! GCM-style HTTP push adapter.
//!
//! One flush becomes one POST carrying the push tokens of every client
//! registered for the rule plus the serialized batch. The response carries
//! one result per recipient, **positionally** aligned with the request's
//! token list; reconciliation walks both lists in lock-step and turns each
//! result into exactly one registry mutation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domopush_core::{Payload, Rule};
use domopush_db::models::Client;
use domopush_db::Registry;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{PushProvider, SendError};

/// Production send endpoint.
pub const GCM_SEND_URL: &str = "https://android.googleapis.com/gcm/send";

/// Default spacing between batch sends on one channel.
const GCM_RATE_LIMIT: Duration = Duration::from_millis(250);

/// Bound on a single batch request. The upstream source had none; a hung
/// provider call must not stall the channel forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error marker meaning the recipient's registration is no longer valid.
const ERROR_NOT_REGISTERED: &str = "NotRegistered";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Batch request body.
#[derive(Debug, Serialize)]
struct GcmRequest<'a> {
    /// Push tokens, in client-list order.
    registration_ids: Vec<&'a str>,
    /// The serialized payload batch.
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    restricted_package_name: Option<&'a str>,
}

/// Batch response body.
#[derive(Debug, Deserialize)]
struct GcmResponse {
    #[serde(default)]
    results: Vec<GcmResult>,
}

/// Per-recipient result entry.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GcmResult {
    message_id: Option<String>,
    registration_id: Option<String>,
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Reconciliation plan
// ---------------------------------------------------------------------------

/// The single registry mutation a result entry maps to.
#[derive(Debug, PartialEq)]
pub(crate) enum ClientAction {
    /// Delivered, and the provider rotated the token.
    RotateToken(String),
    /// Delivered, token unchanged.
    ConfirmDelivery,
    /// The recipient is no longer valid.
    Unregister,
    /// Some other provider-reported error.
    RecordError(String),
    /// Shape not understood; logged and skipped.
    Unsupported,
}

/// Map each result to its action, validating positional correlation first.
///
/// A length mismatch is a protocol violation: the whole batch fails and no
/// mutation from the misaligned response is applied.
pub(crate) fn plan(clients: &[Client], results: &[GcmResult]) -> Result<Vec<ClientAction>, SendError> {
    if clients.len() != results.len() {
        return Err(SendError::Reconciliation {
            expected: clients.len(),
            actual: results.len(),
        });
    }

    Ok(results
        .iter()
        .map(|result| {
            if result.message_id.is_some() {
                return match &result.registration_id {
                    Some(token) => ClientAction::RotateToken(token.clone()),
                    None => ClientAction::ConfirmDelivery,
                };
            }
            match &result.error {
                Some(marker) if marker == ERROR_NOT_REGISTERED => ClientAction::Unregister,
                Some(marker) => ClientAction::RecordError(marker.clone()),
                None => ClientAction::Unsupported,
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// GcmProvider
// ---------------------------------------------------------------------------

/// GCM batch sender over the shared registry.
pub struct GcmProvider {
    registry: Arc<dyn Registry>,
    client: reqwest::Client,
    endpoint: String,
}

impl GcmProvider {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_endpoint(registry, GCM_SEND_URL)
    }

    /// Build a provider targeting a non-default send endpoint.
    pub fn with_endpoint(registry: Arc<dyn Registry>, endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            registry,
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Apply the reconciliation plan, strictly in list order.
    async fn apply(&self, clients: &[Client], actions: Vec<ClientAction>) -> Result<(), SendError> {
        for (client, action) in clients.iter().zip(actions) {
            match action {
                ClientAction::RotateToken(token) => {
                    self.registry.update_token(client, &token).await?;
                }
                ClientAction::ConfirmDelivery => {
                    self.registry.record_success(client).await?;
                }
                ClientAction::Unregister => {
                    self.registry.unregister(client).await?;
                }
                ClientAction::RecordError(marker) => {
                    self.registry.record_error(client, &marker).await?;
                }
                ClientAction::Unsupported => {
                    tracing::warn!(
                        client_id = client.id,
                        device = %client.device_id,
                        "Unsupported result entry, skipping"
                    );
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PushProvider for GcmProvider {
    fn name(&self) -> &'static str {
        "gcm"
    }

    fn default_rate_limit(&self) -> Duration {
        GCM_RATE_LIMIT
    }

    async fn send_batch(&self, rule: &Rule, payloads: &[Payload]) -> Result<(), SendError> {
        let Some(config) = &rule.gcm else {
            // Channels are only built for rules with a gcm block.
            tracing::warn!(rule = %rule.id, "send_batch called without gcm configuration");
            return Ok(());
        };

        let clients = self.registry.list_clients(self.name(), &rule.id).await?;
        if clients.is_empty() {
            tracing::debug!(rule = %rule.id, "No registered clients, dropping batch");
            return Ok(());
        }

        let request = GcmRequest {
            registration_ids: clients.iter().map(|c| c.push_token.as_str()).collect(),
            data: serde_json::to_string(payloads)?,
            restricted_package_name: config.restricted_package_name.as_deref(),
        };

        tracing::debug!(
            rule = %rule.id,
            recipients = clients.len(),
            messages = payloads.len(),
            "Sending batch"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, &config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(rule = %rule.id, "Provider rejected the API key, batch dropped");
            return Ok(());
        }
        if !status.is_success() {
            tracing::warn!(rule = %rule.id, %status, "Provider returned an error status, batch dropped");
            return Ok(());
        }

        let body: GcmResponse = response.json().await?;
        let actions = plan(&clients, &body.results)?;
        self.apply(&clients, actions).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
