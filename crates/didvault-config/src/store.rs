//! Process-wide configuration store.
//!
//! The snapshot is computed lazily on first access and then frozen.
//! `reset` exists so tests can force recomputation after changing their
//! injected environment; production code never calls it.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::snapshot::AppConfig;
use crate::{ConfigError, Result};

/// Holder for the immutable [`AppConfig`] snapshot.
///
/// Reads are lock-free pointer loads; the snapshot is only ever swapped
/// by [`set`](Self::set) and [`reset`](Self::reset).
pub struct ConfigStore {
    snapshot: ArcSwapOption<AppConfig>,
}

impl ConfigStore {
    /// Creates an empty store. The first [`get`](Self::get) populates it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshot: ArcSwapOption::const_empty(),
        }
    }

    /// Returns the current snapshot, computing it from the environment on
    /// first access.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the environment fails to parse; the
    /// store stays empty so a corrected environment can succeed later.
    pub fn get(&self) -> Result<Arc<AppConfig>> {
        if let Some(cfg) = self.snapshot.load_full() {
            return Ok(cfg);
        }
        self.set()
    }

    /// Recomputes the snapshot from the environment unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the environment fails to parse.
    pub fn set(&self) -> Result<Arc<AppConfig>> {
        let cfg = Arc::new(AppConfig::from_env()?);
        tracing::debug!(port = cfg.port, "Configuration snapshot computed");
        self.snapshot.store(Some(Arc::clone(&cfg)));
        Ok(cfg)
    }

    /// Clears the snapshot so the next [`get`](Self::get) recomputes it.
    /// Test isolation only.
    pub fn reset(&self) {
        self.snapshot.store(None);
    }

    /// Stores a prebuilt snapshot, bypassing the environment. Used by
    /// tests that need full control over the configuration.
    pub fn replace(&self, cfg: AppConfig) -> Arc<AppConfig> {
        let cfg = Arc::new(cfg);
        self.snapshot.store(Some(Arc::clone(&cfg)));
        cfg
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: ConfigStore = ConfigStore::new();

/// Returns the process-wide configuration snapshot.
///
/// # Errors
///
/// Returns [`ConfigError`] if the environment fails to parse.
pub fn get_config() -> Result<Arc<AppConfig>> {
    GLOBAL.get()
}

/// Recomputes the process-wide snapshot from the environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if the environment fails to parse.
pub fn set_config() -> Result<Arc<AppConfig>> {
    GLOBAL.set()
}

/// Clears the process-wide snapshot. Test isolation only.
pub fn reset_config() {
    GLOBAL.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_memoizes_the_snapshot() {
        let store = ConfigStore::new();
        let first = store.get().unwrap();
        let second = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reset_forces_recomputation() {
        let store = ConfigStore::new();
        let first = store.get().unwrap();
        store.reset();
        let second = store.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        // Same environment, so the contents still match
        assert_eq!(*first, *second);
    }

    #[test]
    fn set_swaps_even_when_populated() {
        let store = ConfigStore::new();
        let first = store.get().unwrap();
        let second = store.set().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn replace_installs_a_prebuilt_snapshot() {
        let store = ConfigStore::new();
        let cfg = AppConfig {
            port: 9999,
            ..AppConfig::default()
        };
        store.replace(cfg);
        assert_eq!(store.get().unwrap().port, 9999);
    }
}
