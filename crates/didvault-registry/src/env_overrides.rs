//! Per-tenant seed overrides from the process environment.
//!
//! Each `TENANT_SEED_<NAME>` variable declares one tenant. The suffix is
//! lowercased to form the tenant name, but companion variables are looked
//! up with the suffix exactly as written:
//!
//! ```text
//! TENANT_SEED_ACME=z1Aei...        # or the literal sentinel `generate`
//! TENANT_DIDMETHOD_ACME=web        # optional, defaults to key
//! TENANT_DID_URL_ACME=https://...  # optional, did:web anchor
//! ```
//!
//! The reader works on an injected variable snapshot so tests never have
//! to mutate the process environment.

use std::collections::HashMap;

use didvault_core::seed::{decode_seed, generate_secret_key_seed};
use didvault_core::tenant::{DidMethod, TenantSeedEntry};

use crate::Result;

/// Prefix declaring a per-tenant seed variable.
pub const TENANT_SEED_PREFIX: &str = "TENANT_SEED_";

const DID_METHOD_PREFIX: &str = "TENANT_DIDMETHOD_";
const DID_URL_PREFIX: &str = "TENANT_DID_URL_";

/// Sentinel value requesting a freshly generated seed.
const GENERATE_SENTINEL: &str = "generate";

/// Reads tenant overrides from an environment snapshot.
#[derive(Debug, Clone)]
pub struct EnvOverrideReader {
    vars: HashMap<String, String>,
}

impl EnvOverrideReader {
    /// Snapshot of the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Reader over an explicit variable set (used by tests).
    pub fn from_pairs(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Collects one entry per `TENANT_SEED_*` variable.
    ///
    /// A `generate` sentinel is replaced by a fresh seed on every call,
    /// so repeated populations yield different material for such
    /// tenants.
    ///
    /// # Errors
    ///
    /// Returns the first decode failure; unlike the bulk path there is
    /// no per-entry tolerance here, so one bad variable fails the whole
    /// scan.
    pub fn collect(&self) -> Result<Vec<TenantSeedEntry>> {
        let mut seed_keys: Vec<&String> = self
            .vars
            .keys()
            .filter(|key| {
                key.get(..TENANT_SEED_PREFIX.len())
                    .is_some_and(|p| p.eq_ignore_ascii_case(TENANT_SEED_PREFIX))
            })
            .collect();
        // Stable order so same-named overrides resolve deterministically
        seed_keys.sort();

        let mut entries = Vec::with_capacity(seed_keys.len());
        for key in seed_keys {
            let suffix = &key[TENANT_SEED_PREFIX.len()..];
            let tenant_name = suffix.to_lowercase();

            let value = &self.vars[key];
            let seed = if value.as_str() == GENERATE_SENTINEL {
                decode_seed(&generate_secret_key_seed())?
            } else {
                decode_seed(value)?
            };

            let method = self
                .vars
                .get(&format!("{DID_METHOD_PREFIX}{suffix}"))
                .filter(|v| v.eq_ignore_ascii_case("web"))
                .map_or(DidMethod::Key, |_| DidMethod::Web);

            let mut entry = TenantSeedEntry::new(tenant_name, seed).with_method(method);
            if let Some(url) = self.vars.get(&format!("{DID_URL_PREFIX}{suffix}")) {
                entry = entry.with_did_url(url);
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl Default for EnvOverrideReader {
    fn default() -> Self {
        Self::from_process()
    }
}
