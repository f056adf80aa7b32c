//! Bulk tenant sources
//!
//! This crate provides the backends capable of returning a full tenant
//! list in one call:
//! - HTTP API: GET a configured URL with a bearer token
//! - Redis: scan a key namespace and read a `seed` field per key
//! - Cloud secrets manager: list secrets under a name prefix (behind the
//!   `aws-secrets` feature)
//!
//! Exactly one source is active per process; [`select::select_source`]
//! picks the first configured one. Sources return *raw* tenant records;
//! seed decoding and precedence live in the registry crate.

pub mod http;
pub mod kv;
pub mod select;
#[cfg(feature = "aws-secrets")]
pub mod secrets;

pub use http::HttpApiTenantSource;
pub use kv::RedisTenantSource;
pub use select::select_source;
#[cfg(feature = "aws-secrets")]
pub use secrets::SecretsManagerTenantSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error types for bulk source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tenant endpoint returned status {0}")]
    HttpStatus(u16),

    #[error("Invalid tenants URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Tenant list response must be a JSON array")]
    NotAnArray,

    #[error("Failed to parse tenant list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis pool error: {0}")]
    Pool(String),

    #[cfg(feature = "aws-secrets")]
    #[error("Secrets manager error: {0}")]
    Secrets(String),
}

/// One tenant record as returned by a bulk source, seed still encoded.
///
/// The wire shape matches the tenant API: `{"name": ..., "didSeed": ...}`.
/// Missing fields deserialize to empty strings so a single malformed
/// record can be skipped downstream instead of failing the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTenant {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "didSeed")]
    pub raw_seed: String,
}

impl RawTenant {
    pub fn new(name: impl Into<String>, raw_seed: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw_seed: raw_seed.into(),
        }
    }
}

/// Trait for bulk tenant sources
#[async_trait]
pub trait BulkTenantSource: Send + Sync {
    /// Name of this source (for logging and debugging)
    fn name(&self) -> &str;

    /// Fetch the full tenant list.
    ///
    /// Returns `Ok(None)` when the source is not configured (a routing
    /// signal, not an error). An empty list or an `Err` both mean
    /// "configured but failed/empty" and trigger the environment
    /// fallback in the registry.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] on network, store, or parse failures.
    async fn fetch_tenants(&self) -> Result<Option<Vec<RawTenant>>, SourceError>;
}
