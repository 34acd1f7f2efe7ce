//! The registry contract consumed by the dispatch engine.
//!
//! [`Registry`] is the only mutation surface for client records. The GCM
//! adapter reconciles batch responses through it, the registration endpoint
//! upserts through it, and decorators may read through it. [`SqliteRegistry`]
//! is the production implementation; tests substitute recording mocks.

use async_trait::async_trait;

use crate::models::client::Client;
use crate::repositories::ClientRepo;
use crate::DbPool;

/// Error raised by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The underlying database operation failed.
    #[error("Registry database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD-style contract over the persisted client registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Clients registered for a (provider, rule) pair, in registration
    /// order. Batch responses are reconciled positionally against this
    /// list, so the order must be stable between calls.
    async fn list_clients(
        &self,
        provider: &str,
        rule_id: &str,
    ) -> Result<Vec<Client>, RegistryError>;

    /// Number of clients registered for a (provider, rule) pair.
    async fn count_clients(&self, provider: &str, rule_id: &str) -> Result<i64, RegistryError>;

    /// Register a device or refresh its token, keyed by
    /// (provider, rule, device).
    async fn register_client(
        &self,
        provider: &str,
        rule_id: &str,
        device_id: &str,
        push_token: &str,
    ) -> Result<(), RegistryError>;

    /// Replace a client's push token (provider-signalled rotation).
    async fn update_token(&self, client: &Client, new_token: &str) -> Result<(), RegistryError>;

    /// Record a confirmed delivery. No persistent effect.
    async fn record_success(&self, client: &Client) -> Result<(), RegistryError>;

    /// Record a provider-reported delivery error. No state change.
    async fn record_error(&self, client: &Client, marker: &str) -> Result<(), RegistryError>;

    /// Remove a client whose registration is no longer valid.
    async fn unregister(&self, client: &Client) -> Result<(), RegistryError>;
}

/// Production registry over the SQLite `clients` table.
pub struct SqliteRegistry {
    pool: DbPool,
}

impl SqliteRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Registry for SqliteRegistry {
    async fn list_clients(
        &self,
        provider: &str,
        rule_id: &str,
    ) -> Result<Vec<Client>, RegistryError> {
        Ok(ClientRepo::list_for_rule(&self.pool, provider, rule_id).await?)
    }

    async fn count_clients(&self, provider: &str, rule_id: &str) -> Result<i64, RegistryError> {
        Ok(ClientRepo::count_for_rule(&self.pool, provider, rule_id).await?)
    }

    async fn register_client(
        &self,
        provider: &str,
        rule_id: &str,
        device_id: &str,
        push_token: &str,
    ) -> Result<(), RegistryError> {
        tracing::info!(provider, rule = %rule_id, device = %device_id, "Registering client");
        Ok(ClientRepo::upsert(&self.pool, provider, rule_id, device_id, push_token).await?)
    }

    async fn update_token(&self, client: &Client, new_token: &str) -> Result<(), RegistryError> {
        tracing::info!(client_id = client.id, device = %client.device_id, "Rotating push token");
        Ok(ClientRepo::update_token(&self.pool, client.id, new_token).await?)
    }

    async fn record_success(&self, client: &Client) -> Result<(), RegistryError> {
        tracing::debug!(client_id = client.id, device = %client.device_id, "Delivery confirmed");
        Ok(())
    }

    async fn record_error(&self, client: &Client, marker: &str) -> Result<(), RegistryError> {
        tracing::warn!(
            client_id = client.id,
            device = %client.device_id,
            marker,
            "Provider reported a delivery error"
        );
        Ok(())
    }

    async fn unregister(&self, client: &Client) -> Result<(), RegistryError> {
        tracing::info!(
            client_id = client.id,
            device = %client.device_id,
            "Unregistering invalid client"
        );
        Ok(ClientRepo::delete(&self.pool, client.id).await?)
    }
}
