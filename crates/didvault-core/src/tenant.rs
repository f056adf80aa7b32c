//! Tenant seed entries and the fixed tenants every deployment carries.

use serde::{Deserialize, Serialize};

use crate::seed::DidSeed;

/// Primary fixed test tenant, always resolvable once the registry is populated.
pub const TEST_TENANT_NAME: &str = "testing";

/// Secondary fixed test tenant, mapped to the same seed as the primary one.
pub const SECOND_TEST_TENANT_NAME: &str = "test";

/// Tenant holding a freshly generated seed; present only when tenants are
/// sourced from the environment.
pub const RANDOM_TENANT_NAME: &str = "random";

/// Well-known seed backing both fixed test tenants.
pub const DEFAULT_TEST_SEED: &str = "z1AeiPT496wWmo9BG2QYXeTusgFSZPNG3T9wNeTtjrQ3rCB";

/// DID derivation method for a tenant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DidMethod {
    /// `did:key`, derived directly from the seed.
    #[default]
    Key,
    /// `did:web`, anchored at the tenant's configured URL.
    Web,
}

impl std::fmt::Display for DidMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::Web => f.write_str("web"),
        }
    }
}

/// One resolved tenant: decoded seed material plus derivation method.
///
/// Entries only ever hold a fully decoded seed; raw seed text never
/// reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSeedEntry {
    /// Unique tenant name. Lowercased when derived from an environment
    /// variable, case-preserved when sourced from a bulk backend.
    pub tenant_name: String,
    /// Decoded seed material.
    pub did_seed: DidSeed,
    /// Derivation method, `Key` unless explicitly overridden.
    pub did_method: DidMethod,
    /// Anchor URL, only meaningful for `Web`.
    pub did_url: Option<String>,
}

impl TenantSeedEntry {
    /// Creates an entry with the default `did:key` method.
    #[must_use]
    pub fn new(tenant_name: impl Into<String>, did_seed: DidSeed) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            did_seed,
            did_method: DidMethod::default(),
            did_url: None,
        }
    }

    /// Sets the derivation method.
    #[must_use]
    pub fn with_method(mut self, method: DidMethod) -> Self {
        self.did_method = method;
        self
    }

    /// Sets the `did:web` anchor URL.
    #[must_use]
    pub fn with_did_url(mut self, url: impl Into<String>) -> Self {
        self.did_url = Some(url.into());
        self
    }
}
