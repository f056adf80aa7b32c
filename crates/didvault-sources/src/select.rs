//! Source selection.
//!
//! Deployments configure at most one bulk backend; when several are
//! configured the first in the fixed order below wins:
//!
//! 1. HTTP API (`TENANTS_API_URL`)
//! 2. Redis (`REDIS_URI`)
//! 3. Cloud secrets manager (`TENANTS_SECRETS_MANAGER`, `aws-secrets` feature)
//!
//! In test mode every backend is bypassed with a source that reports an
//! empty list, which sends the registry down the environment path.

use std::sync::Arc;

use async_trait::async_trait;

use didvault_config::AppConfig;

use crate::http::HttpApiTenantSource;
use crate::kv::RedisTenantSource;
use crate::{BulkTenantSource, RawTenant, SourceError};

/// Picks the bulk source for this process, or `None` when no backend is
/// configured (the registry then always uses the environment path).
pub async fn select_source(config: &AppConfig) -> Option<Arc<dyn BulkTenantSource>> {
    if config.test_mode {
        tracing::debug!("Tenant source test mode: bypassing bulk backends");
        return Some(Arc::new(TestBypassSource));
    }

    if config.tenants_url.is_some() {
        return Some(Arc::new(HttpApiTenantSource::new(
            config.tenants_url.clone(),
            config.tenants_url_token.clone(),
        )));
    }

    if let Some(uri) = config.redis_uri.as_deref() {
        match RedisTenantSource::new(uri) {
            Ok(source) => return Some(Arc::new(source)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to set up Redis tenant source");
                return None;
            }
        }
    }

    #[cfg(feature = "aws-secrets")]
    if config.secrets_manager_enabled {
        return Some(Arc::new(
            crate::secrets::SecretsManagerTenantSource::new(config.secrets_tenant_prefix.clone())
                .await,
        ));
    }

    None
}

/// Bypass source for tests: configured, but always empty.
struct TestBypassSource;

#[async_trait]
impl BulkTenantSource for TestBypassSource {
    fn name(&self) -> &str {
        "test-bypass"
    }

    async fn fetch_tenants(&self) -> Result<Option<Vec<RawTenant>>, SourceError> {
        Ok(Some(Vec::new()))
    }
}
