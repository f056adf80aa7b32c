//! The memoized tenant seed registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use didvault_config::AppConfig;
use didvault_core::seed::{decode_seed, generate_secret_key_seed};
use didvault_core::tenant::{
    DEFAULT_TEST_SEED, RANDOM_TENANT_NAME, SECOND_TEST_TENANT_NAME, TEST_TENANT_NAME,
    TenantSeedEntry,
};
use didvault_sources::{BulkTenantSource, RawTenant};

use crate::Result;
use crate::env_overrides::EnvOverrideReader;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lazily populated map from tenant name to decoded seed entry.
///
/// Population runs at most once per registry (single-flight: concurrent
/// cold-start lookups share one pass) and consults at most one bulk
/// source. A non-empty bulk result is authoritative; otherwise the
/// environment path runs. After population every lookup is a plain map
/// read.
pub struct TenantRegistry {
    source: Option<Arc<dyn BulkTenantSource>>,
    env: EnvOverrideReader,
    seeds: RwLock<HashMap<String, TenantSeedEntry>>,
    populated: AtomicBool,
    populate_guard: Mutex<()>,
    fetch_timeout: Duration,
}

impl TenantRegistry {
    /// Registry with no bulk source, reading overrides from the process
    /// environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            env: EnvOverrideReader::from_process(),
            seeds: RwLock::new(HashMap::new()),
            populated: AtomicBool::new(false),
            populate_guard: Mutex::new(()),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Registry wired from the configuration snapshot: the first
    /// configured bulk backend, process environment overrides.
    pub async fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        if let Some(source) = didvault_sources::select_source(config).await {
            registry.source = Some(source);
        }
        registry
    }

    /// Sets the bulk source.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn BulkTenantSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replaces the environment snapshot (used by tests).
    #[must_use]
    pub fn with_env_reader(mut self, env: EnvOverrideReader) -> Self {
        self.env = env;
        self
    }

    /// Bounds the bulk fetch; a timeout falls back to the environment
    /// path like any other fetch failure.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Looks up a tenant, populating the registry on first use.
    ///
    /// Unknown tenants are `Ok(None)`, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistryError`] only when a cold-start population
    /// runs the environment path and a seed variable fails to decode.
    pub async fn get_tenant_seed(&self, tenant_name: &str) -> Result<Option<TenantSeedEntry>> {
        self.ensure_populated().await?;
        Ok(self.seeds.read().await.get(tenant_name).cloned())
    }

    /// Whether a population pass has completed.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.populated.load(Ordering::Acquire)
    }

    /// Removes a single entry without triggering repopulation.
    /// Fault injection for tests: the tenant becomes unresolvable.
    pub async fn delete_seed(&self, tenant_name: &str) {
        self.seeds.write().await.remove(tenant_name);
    }

    /// Clears the registry; the next lookup repopulates from scratch.
    pub async fn reset(&self) {
        let _guard = self.populate_guard.lock().await;
        self.seeds.write().await.clear();
        self.populated.store(false, Ordering::Release);
    }

    /// Forces repopulation now, replacing the current map.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistryError`] if the environment path runs and
    /// a seed variable fails to decode.
    pub async fn fetch_and_update_tenant_seeds(&self) -> Result<()> {
        let _guard = self.populate_guard.lock().await;
        self.populate().await
    }

    async fn ensure_populated(&self) -> Result<()> {
        if self.is_populated() {
            return Ok(());
        }
        let _guard = self.populate_guard.lock().await;
        // Re-check: another caller may have populated while we waited
        if self.is_populated() {
            return Ok(());
        }
        self.populate().await
    }

    async fn populate(&self) -> Result<()> {
        let mut map = HashMap::new();

        match self.fetch_bulk().await {
            Some(records) if !records.is_empty() => {
                for record in records {
                    insert_bulk_record(&mut map, record);
                }
                // Test tenants are reachable regardless of source
                insert_fixed_test_tenants(&mut map)?;
                // A non-empty bulk list is authoritative: environment
                // overrides are not layered on top
            }
            _ => {
                insert_fixed_test_tenants(&mut map)?;
                let random = decode_seed(&generate_secret_key_seed())?;
                map.insert(
                    RANDOM_TENANT_NAME.to_string(),
                    TenantSeedEntry::new(RANDOM_TENANT_NAME, random),
                );
                for entry in self.env.collect()? {
                    map.insert(entry.tenant_name.clone(), entry);
                }
            }
        }

        tracing::info!(tenants = map.len(), "Tenant registry populated");
        *self.seeds.write().await = map;
        self.populated.store(true, Ordering::Release);
        Ok(())
    }

    /// Queries the bulk source, folding every failure mode into `None`
    /// so population falls through to the environment path.
    async fn fetch_bulk(&self) -> Option<Vec<RawTenant>> {
        let source = self.source.as_ref()?;
        match tokio::time::timeout(self.fetch_timeout, source.fetch_tenants()).await {
            Ok(Ok(Some(records))) => {
                tracing::debug!(
                    source = source.name(),
                    count = records.len(),
                    "Fetched bulk tenant list"
                );
                Some(records)
            }
            Ok(Ok(None)) => {
                tracing::debug!(source = source.name(), "Bulk source not configured");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    source = source.name(),
                    error = %e,
                    "Bulk tenant fetch failed; falling back to environment tenants"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    source = source.name(),
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "Bulk tenant fetch timed out; falling back to environment tenants"
                );
                None
            }
        }
    }
}

impl Default for TenantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_bulk_record(map: &mut HashMap<String, TenantSeedEntry>, record: RawTenant) {
    if record.name.is_empty() {
        tracing::warn!("Skipping tenant record without name");
        return;
    }
    if record.raw_seed.is_empty() {
        tracing::warn!(tenant = %record.name, "Skipping tenant record without seed");
        return;
    }
    match decode_seed(&record.raw_seed) {
        Ok(seed) => {
            map.insert(record.name.clone(), TenantSeedEntry::new(record.name, seed));
        }
        Err(e) => {
            tracing::warn!(
                tenant = %record.name,
                error = %e,
                "Skipping tenant record with undecodable seed"
            );
        }
    }
}

fn insert_fixed_test_tenants(map: &mut HashMap<String, TenantSeedEntry>) -> Result<()> {
    let seed = decode_seed(DEFAULT_TEST_SEED)?;
    map.insert(
        TEST_TENANT_NAME.to_string(),
        TenantSeedEntry::new(TEST_TENANT_NAME, seed.clone()),
    );
    map.insert(
        SECOND_TEST_TENANT_NAME.to_string(),
        TenantSeedEntry::new(SECOND_TEST_TENANT_NAME, seed),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use didvault_sources::SourceError;

    /// Scripted bulk source that counts fetches.
    struct MockSource {
        response: MockResponse,
        calls: AtomicUsize,
    }

    enum MockResponse {
        Unconfigured,
        Empty,
        Failing,
        Records(Vec<RawTenant>),
        Slow(Duration),
    }

    impl MockSource {
        fn new(response: MockResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BulkTenantSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_tenants(&self) -> std::result::Result<Option<Vec<RawTenant>>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                MockResponse::Unconfigured => Ok(None),
                MockResponse::Empty => Ok(Some(Vec::new())),
                MockResponse::Failing => Err(SourceError::HttpStatus(500)),
                MockResponse::Records(records) => Ok(Some(records.clone())),
                MockResponse::Slow(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(Some(vec![RawTenant::new("slow", DEFAULT_TEST_SEED)]))
                }
            }
        }
    }

    fn env(pairs: &[(&str, &str)]) -> EnvOverrideReader {
        EnvOverrideReader::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        )
    }

    fn registry_without_source() -> TenantRegistry {
        TenantRegistry::new().with_env_reader(env(&[]))
    }

    #[tokio::test]
    async fn unknown_tenant_resolves_to_none() {
        let registry = registry_without_source();
        assert!(registry.get_tenant_seed("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fixed_test_tenants_share_seed_material_on_the_env_path() {
        let registry = registry_without_source();
        let primary = registry.get_tenant_seed("testing").await.unwrap().unwrap();
        let secondary = registry.get_tenant_seed("test").await.unwrap().unwrap();
        assert_eq!(primary.did_seed, secondary.did_seed);
        assert_eq!(primary.did_seed, decode_seed(DEFAULT_TEST_SEED).unwrap());
    }

    #[tokio::test]
    async fn env_path_includes_the_random_tenant() {
        let registry = registry_without_source();
        let random = registry.get_tenant_seed("random").await.unwrap().unwrap();
        assert_ne!(random.did_seed, decode_seed(DEFAULT_TEST_SEED).unwrap());
    }

    #[tokio::test]
    async fn random_tenant_seed_differs_across_resets() {
        let registry = registry_without_source();
        let first = registry.get_tenant_seed("random").await.unwrap().unwrap();
        registry.reset().await;
        let second = registry.get_tenant_seed("random").await.unwrap().unwrap();
        assert_ne!(first.did_seed, second.did_seed);
    }

    #[tokio::test]
    async fn bulk_records_win_and_env_overrides_are_skipped() {
        let source = MockSource::new(MockResponse::Records(vec![RawTenant::new(
            "acme",
            DEFAULT_TEST_SEED,
        )]));
        let registry = TenantRegistry::new()
            .with_source(source)
            .with_env_reader(env(&[("TENANT_SEED_OTHER", DEFAULT_TEST_SEED)]));

        let acme = registry.get_tenant_seed("acme").await.unwrap().unwrap();
        assert_eq!(acme.did_method, didvault_core::tenant::DidMethod::Key);
        assert_eq!(acme.did_seed, decode_seed(DEFAULT_TEST_SEED).unwrap());

        // Fixed test tenants still reachable in the bulk path
        assert!(registry.get_tenant_seed("testing").await.unwrap().is_some());
        assert!(registry.get_tenant_seed("test").await.unwrap().is_some());

        // Env override not applied, random tenant absent
        assert!(registry.get_tenant_seed("other").await.unwrap().is_none());
        assert!(registry.get_tenant_seed("random").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_bulk_records_are_skipped_individually() {
        let source = MockSource::new(MockResponse::Records(vec![
            RawTenant::new("acme", DEFAULT_TEST_SEED),
            RawTenant::new("", DEFAULT_TEST_SEED),
            RawTenant::new("noseed", ""),
            RawTenant::new("badseed", "zzzz-not-a-seed"),
        ]));
        let registry = TenantRegistry::new()
            .with_source(source)
            .with_env_reader(env(&[]));

        assert!(registry.get_tenant_seed("acme").await.unwrap().is_some());
        assert!(registry.get_tenant_seed("noseed").await.unwrap().is_none());
        assert!(registry.get_tenant_seed("badseed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_bulk_list_falls_back_to_the_env_path() {
        let source = MockSource::new(MockResponse::Empty);
        let registry = TenantRegistry::new()
            .with_source(Arc::clone(&source) as Arc<dyn BulkTenantSource>)
            .with_env_reader(env(&[("TENANT_SEED_FOO", DEFAULT_TEST_SEED)]));

        assert!(registry.get_tenant_seed("foo").await.unwrap().is_some());
        assert!(registry.get_tenant_seed("random").await.unwrap().is_some());
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn failing_bulk_source_falls_back_to_the_env_path() {
        let source = MockSource::new(MockResponse::Failing);
        let registry = TenantRegistry::new()
            .with_source(source)
            .with_env_reader(env(&[]));
        assert!(registry.get_tenant_seed("testing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unconfigured_bulk_source_falls_back_to_the_env_path() {
        let source = MockSource::new(MockResponse::Unconfigured);
        let registry = TenantRegistry::new()
            .with_source(source)
            .with_env_reader(env(&[]));
        assert!(registry.get_tenant_seed("random").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn slow_bulk_source_times_out_into_the_env_path() {
        let source = MockSource::new(MockResponse::Slow(Duration::from_millis(200)));
        let registry = TenantRegistry::new()
            .with_source(source)
            .with_env_reader(env(&[]))
            .with_fetch_timeout(Duration::from_millis(20));

        assert!(registry.get_tenant_seed("slow").await.unwrap().is_none());
        assert!(registry.get_tenant_seed("testing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn env_decode_failure_fails_the_population() {
        let registry =
            TenantRegistry::new().with_env_reader(env(&[("TENANT_SEED_BAD", "not-a-seed")]));
        assert!(registry.get_tenant_seed("testing").await.is_err());
        assert!(!registry.is_populated());
    }

    #[tokio::test]
    async fn delete_seed_does_not_trigger_repopulation() {
        let source = MockSource::new(MockResponse::Empty);
        let registry = TenantRegistry::new()
            .with_source(Arc::clone(&source) as Arc<dyn BulkTenantSource>)
            .with_env_reader(env(&[]));

        assert!(registry.get_tenant_seed("testing").await.unwrap().is_some());
        registry.delete_seed("testing").await;
        assert!(registry.get_tenant_seed("testing").await.unwrap().is_none());
        // Still one population pass
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn reset_retriggers_population() {
        let source = MockSource::new(MockResponse::Empty);
        let registry = TenantRegistry::new()
            .with_source(Arc::clone(&source) as Arc<dyn BulkTenantSource>)
            .with_env_reader(env(&[]));

        registry.get_tenant_seed("testing").await.unwrap();
        assert_eq!(source.call_count(), 1);
        registry.reset().await;
        assert!(!registry.is_populated());
        registry.get_tenant_seed("testing").await.unwrap();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn forced_repopulation_replaces_the_map() {
        let source = MockSource::new(MockResponse::Empty);
        let registry = TenantRegistry::new()
            .with_source(Arc::clone(&source) as Arc<dyn BulkTenantSource>)
            .with_env_reader(env(&[]));

        registry.get_tenant_seed("testing").await.unwrap();
        registry.delete_seed("testing").await;
        registry.fetch_and_update_tenant_seeds().await.unwrap();
        assert!(registry.get_tenant_seed("testing").await.unwrap().is_some());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn concurrent_cold_start_lookups_share_one_population() {
        let source = MockSource::new(MockResponse::Slow(Duration::from_millis(50)));
        let registry = Arc::new(
            TenantRegistry::new()
                .with_source(Arc::clone(&source) as Arc<dyn BulkTenantSource>)
                .with_env_reader(env(&[])),
        );

        let lookups = (0..8).map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.get_tenant_seed("slow").await })
        });
        for handle in lookups {
            assert!(handle.await.unwrap().unwrap().is_some());
        }
        assert_eq!(source.call_count(), 1);
    }
}
