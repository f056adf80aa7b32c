//! Tenant list over HTTP.
//!
//! GETs a configured URL with a bearer token and expects a JSON array of
//! `{name, didSeed}` objects. A missing token is treated like an
//! unconfigured source (with an error log) rather than a failure, so a
//! half-configured deployment still starts on the environment path.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::{BulkTenantSource, RawTenant, SourceError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bulk source backed by a tenant-listing HTTP API.
pub struct HttpApiTenantSource {
    client: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
}

impl HttpApiTenantSource {
    /// Creates the source. `url` unset means "not configured".
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    #[must_use]
    pub fn new(url: Option<String>, token: Option<String>) -> Self {
        Self::with_timeout(url, token, DEFAULT_TIMEOUT)
    }

    /// Creates the source with an explicit request timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    #[must_use]
    pub fn with_timeout(url: Option<String>, token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, url, token }
    }
}

#[async_trait]
impl BulkTenantSource for HttpApiTenantSource {
    fn name(&self) -> &str {
        "http-api"
    }

    async fn fetch_tenants(&self) -> Result<Option<Vec<RawTenant>>, SourceError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(None);
        };
        let Some(token) = self.token.as_deref() else {
            tracing::error!("TENANTS_API_TOKEN is not set; ignoring tenant API URL");
            return Ok(None);
        };

        let url = Url::parse(url).map_err(|source| SourceError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!(url = %url, "Fetching tenant list from API");
        let response = self.client.get(url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        if !body.is_array() {
            return Err(SourceError::NotAnArray);
        }
        let tenants: Vec<RawTenant> = serde_json::from_value(body)?;

        tracing::debug!(count = tenants.len(), "Fetched tenant list from API");
        Ok(Some(tenants))
    }
}
