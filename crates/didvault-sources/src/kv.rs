//! Tenant list from a Redis key-value registry.
//!
//! Tenants live under `tenantPrivate:<name>` hashes with the encoded
//! seed in a `seed` field. The scan doubles as the operational
//! enumeration read ([`RedisTenantSource::all_tenants`]) used by tooling
//! to inspect registered tenants without going through the decoded cache.

use deadpool_redis::Pool;
use futures_util::future::try_join_all;
use redis::AsyncCommands;

use async_trait::async_trait;

use crate::{BulkTenantSource, RawTenant, SourceError};

/// Key namespace holding one hash per tenant.
const TENANT_KEY_NAMESPACE: &str = "tenantPrivate:";

/// Hash field holding the encoded seed.
const SEED_FIELD: &str = "seed";

/// Bulk source backed by a Redis tenant registry.
pub struct RedisTenantSource {
    pool: Pool,
}

impl RedisTenantSource {
    /// Creates the source from a Redis connection URI.
    ///
    /// Pool creation does not contact the server; connection errors
    /// surface on first fetch.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Pool`] if the URI cannot be turned into a
    /// connection pool.
    pub fn new(redis_uri: &str) -> Result<Self, SourceError> {
        let pool = deadpool_redis::Config::from_url(redis_uri)
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| SourceError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Lists every registered tenant straight from the store.
    ///
    /// This bypasses any decoded cache; seeds come back in their raw
    /// textual form. Tenants whose hash lacks a seed field are returned
    /// with an empty seed so callers can see (and report) them.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] on connection or command failures.
    pub async fn all_tenants(&self) -> Result<Vec<RawTenant>, SourceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SourceError::Pool(e.to_string()))?;

        let pattern = format!("{TENANT_KEY_NAMESPACE}*");
        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        drop(conn);

        // One HGET per key, issued as a batch
        let tenants = try_join_all(keys.into_iter().map(|key| {
            let pool = self.pool.clone();
            async move {
                let mut conn = pool
                    .get()
                    .await
                    .map_err(|e| SourceError::Pool(e.to_string()))?;
                let seed: Option<String> = conn.hget(&key, SEED_FIELD).await?;
                Ok::<_, SourceError>(RawTenant::new(
                    tenant_name_from_key(&key),
                    seed.unwrap_or_default(),
                ))
            }
        }))
        .await?;

        tracing::debug!(count = tenants.len(), "Scanned tenant registry");
        Ok(tenants)
    }
}

#[async_trait]
impl BulkTenantSource for RedisTenantSource {
    fn name(&self) -> &str {
        "redis"
    }

    async fn fetch_tenants(&self) -> Result<Option<Vec<RawTenant>>, SourceError> {
        self.all_tenants().await.map(Some)
    }
}

/// The tenant name is the key without its namespace prefix.
fn tenant_name_from_key(key: &str) -> &str {
    key.strip_prefix(TENANT_KEY_NAMESPACE).unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_namespace_prefix() {
        assert_eq!(tenant_name_from_key("tenantPrivate:acme"), "acme");
        // Bulk-sourced names keep their case
        assert_eq!(tenant_name_from_key("tenantPrivate:Acme"), "Acme");
    }

    #[test]
    fn leaves_unprefixed_keys_alone() {
        assert_eq!(tenant_name_from_key("acme"), "acme");
    }

    #[test]
    fn pool_creation_does_not_require_a_server() {
        assert!(RedisTenantSource::new("redis://127.0.0.1:6379").is_ok());
    }
}
