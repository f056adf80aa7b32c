//! Tenant list from the cloud secrets manager.
//!
//! Tenants are stored one per secret under a shared name prefix
//! (`tenant/<name>` by default); each secret's string payload is JSON
//! with a `seed` field. Enabled via the `aws-secrets` cargo feature.

use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use aws_sdk_secretsmanager::types::{Filter, FilterNameStringType};
use serde::Deserialize;

use async_trait::async_trait;

use crate::{BulkTenantSource, RawTenant, SourceError};

/// String payload stored per tenant secret.
#[derive(Debug, Default, Deserialize)]
struct SecretPayload {
    #[serde(default)]
    seed: String,
}

/// Bulk source backed by the cloud secrets manager listing.
pub struct SecretsManagerTenantSource {
    client: SecretsManagerClient,
    tenant_prefix: String,
}

impl SecretsManagerTenantSource {
    /// Creates the source using the ambient credential chain.
    pub async fn new(tenant_prefix: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: SecretsManagerClient::new(&config),
            tenant_prefix: tenant_prefix.into(),
        }
    }

    /// Creates the source with an explicit client (for tests).
    #[must_use]
    pub fn with_client(client: SecretsManagerClient, tenant_prefix: impl Into<String>) -> Self {
        Self {
            client,
            tenant_prefix: tenant_prefix.into(),
        }
    }
}

#[async_trait]
impl BulkTenantSource for SecretsManagerTenantSource {
    fn name(&self) -> &str {
        "secrets-manager"
    }

    async fn fetch_tenants(&self) -> Result<Option<Vec<RawTenant>>, SourceError> {
        let mut tenants = Vec::new();

        let mut pages = self
            .client
            .list_secrets()
            .filters(
                Filter::builder()
                    .key(FilterNameStringType::Name)
                    .values(&self.tenant_prefix)
                    .build(),
            )
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| SourceError::Secrets(e.to_string()))?;
            for entry in page.secret_list() {
                let Some(name) = entry.name() else { continue };
                // The tenant name is the path segment after the prefix
                let Some(tenant) = name.strip_prefix(&self.tenant_prefix) else {
                    continue;
                };

                let value = self
                    .client
                    .get_secret_value()
                    .secret_id(name)
                    .send()
                    .await
                    .map_err(|e| SourceError::Secrets(e.to_string()))?;

                // An unparseable payload becomes an empty seed, which the
                // registry skips with a warning
                let payload: SecretPayload = value
                    .secret_string()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_default();
                tenants.push(RawTenant::new(tenant, payload.seed));
            }
        }

        tracing::debug!(count = tenants.len(), "Listed tenant secrets");
        Ok(Some(tenants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_seed_field() {
        let payload: SecretPayload = serde_json::from_str(r#"{"seed": "zAbc"}"#).unwrap();
        assert_eq!(payload.seed, "zAbc");
    }

    #[test]
    fn payload_without_seed_is_empty() {
        let payload: SecretPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.seed.is_empty());
    }
}
