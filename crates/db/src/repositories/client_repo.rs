//! Repository for the `clients` table.

use chrono::Utc;
use domopush_core::types::DbId;

use crate::models::client::Client;
use crate::DbPool;

/// Column list for `clients` queries.
const CLIENT_COLUMNS: &str = "id, provider, rule_id, device_id, push_token, updated_at";

/// Provides read/write operations for registered push clients.
pub struct ClientRepo;

impl ClientRepo {
    /// List the clients registered for a (provider, rule) pair, in
    /// registration order.
    ///
    /// The provider adapter correlates batch response entries positionally
    /// against this list, so the order must be stable between calls.
    pub async fn list_for_rule(
        pool: &DbPool,
        provider: &str,
        rule_id: &str,
    ) -> Result<Vec<Client>, sqlx::Error> {
        let query =
            format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE provider = ?1 AND rule_id = ?2 ORDER BY id");
        sqlx::query_as::<_, Client>(&query)
            .bind(provider)
            .bind(rule_id)
            .fetch_all(pool)
            .await
    }

    /// Count the clients registered for a (provider, rule) pair.
    pub async fn count_for_rule(
        pool: &DbPool,
        provider: &str,
        rule_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE provider = ?1 AND rule_id = ?2")
            .bind(provider)
            .bind(rule_id)
            .fetch_one(pool)
            .await
    }

    /// Register a device or refresh its token, keyed by
    /// (provider, rule, device).
    pub async fn upsert(
        pool: &DbPool,
        provider: &str,
        rule_id: &str,
        device_id: &str,
        push_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO clients (provider, rule_id, device_id, push_token, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (provider, rule_id, device_id) \
             DO UPDATE SET push_token = excluded.push_token, updated_at = excluded.updated_at",
        )
        .bind(provider)
        .bind(rule_id)
        .bind(device_id)
        .bind(push_token)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace a client's push token after a provider-signalled rotation.
    pub async fn update_token(
        pool: &DbPool,
        client_id: DbId,
        new_token: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE clients SET push_token = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(new_token)
            .bind(Utc::now())
            .bind(client_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove a client record.
    pub async fn delete(pool: &DbPool, client_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(client_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
