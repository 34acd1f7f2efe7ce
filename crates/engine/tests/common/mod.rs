//! Shared test doubles for engine integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use domopush_core::{Payload, Rule};
use domopush_db::models::Client;
use domopush_db::{Registry, RegistryError};
use domopush_engine::{PushProvider, SendError};

/// One registry mutation observed by [`MockRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryCall {
    UpdateToken { client_id: i64, new_token: String },
    RecordSuccess { client_id: i64 },
    RecordError { client_id: i64, marker: String },
    Unregister { client_id: i64 },
}

/// In-memory registry that serves a fixed client list and records every
/// mutation request in call order.
#[derive(Default)]
pub struct MockRegistry {
    clients: Vec<Client>,
    calls: Mutex<Vec<RegistryCall>>,
}

impl MockRegistry {
    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self {
            clients,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn list_clients(&self, _: &str, _: &str) -> Result<Vec<Client>, RegistryError> {
        Ok(self.clients.clone())
    }

    async fn count_clients(&self, _: &str, _: &str) -> Result<i64, RegistryError> {
        Ok(self.clients.len() as i64)
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

    async fn update_token(&self, client: &Client, new_token: &str) -> Result<(), RegistryError> {
        self.calls.lock().unwrap().push(RegistryCall::UpdateToken {
            client_id: client.id,
            new_token: new_token.to_string(),
        });
        Ok(())
    }

    async fn record_success(&self, client: &Client) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::RecordSuccess {
                client_id: client.id,
            });
        Ok(())
    }

    async fn record_error(&self, client: &Client, marker: &str) -> Result<(), RegistryError> {
        self.calls.lock().unwrap().push(RegistryCall::RecordError {
            client_id: client.id,
            marker: marker.to_string(),
        });
        Ok(())
    }

    async fn unregister(&self, client: &Client) -> Result<(), RegistryError> {
        self.calls.lock().unwrap().push(RegistryCall::Unregister {
            client_id: client.id,
        });
        Ok(())
    }
}

/// Registry whose read operations always fail, for driving the decorator
/// failure path.
pub struct FailingRegistry;

#[async_trait]
impl Registry for FailingRegistry {
    async fn list_clients(&self, _: &str, _: &str) -> Result<Vec<Client>, RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn count_clients(&self, _: &str, _: &str) -> Result<i64, RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn register_client(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: &str,
    ) -> Result<(), RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn update_token(&self, _: &Client, _: &str) -> Result<(), RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn record_success(&self, _: &Client) -> Result<(), RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn record_error(&self, _: &Client, _: &str) -> Result<(), RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }

    async fn unregister(&self, _: &Client) -> Result<(), RegistryError> {
        Err(RegistryError::Database(sqlx::Error::PoolClosed))
    }
}

/// Provider that records every batch it is asked to send.
pub struct RecordingProvider {
    rate_limit: Duration,
    batches: Mutex<Vec<Vec<Payload>>>,
}

impl RecordingProvider {
    pub fn new(rate_limit: Duration) -> Arc<Self> {
        Arc::new(Self {
            rate_limit,
            batches: Mutex::new(Vec::new()),
        })
    }

    pub fn batches(&self) -> Vec<Vec<Payload>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "gcm"
    }

    fn default_rate_limit(&self) -> Duration {
        self.rate_limit
    }

    async fn send_batch(&self, _rule: &Rule, payloads: &[Payload]) -> Result<(), SendError> {
        self.batches.lock().unwrap().push(payloads.to_vec());
        Ok(())
    }
}

/// Build a client row for test fixtures.
pub fn client(id: i64, device: &str, token: &str) -> Client {
    Client {
        id,
        provider: "gcm".into(),
        rule_id: "alarm".into(),
        device_id: device.into(),
        push_token: token.into(),
        updated_at: Utc::now(),
    }
}

/// Parse a rule from inline JSON.
pub fn rule(json: &str) -> Arc<Rule> {
    Arc::new(serde_json::from_str(json).expect("test rule parses"))
}

/// Build an event body from (key, value) string pairs.
pub fn body(pairs: &[(&str, &str)]) -> Payload {
    let mut body = Payload::new();
    for (k, v) in pairs {
        body.insert((*k).into(), (*v).into());
    }
    body
}
