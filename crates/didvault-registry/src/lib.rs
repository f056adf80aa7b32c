//! Tenant seed resolution
//!
//! The [`TenantRegistry`] turns raw tenant records from at most one bulk
//! backend, plus environment overrides, into a memoized map of decoded
//! [`TenantSeedEntry`] values:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   TenantRegistry                      │
//! │   ┌───────────────┐      ┌────────────────────────┐  │
//! │   │ BulkTenant    │ ───▶ │ decode + fixed tenants │  │
//! │   │ Source (one)  │      └────────────┬───────────┘  │
//! │   └───────┬───────┘                   │              │
//! │           │ unavailable/empty/error   ▼              │
//! │   ┌───────▼───────┐      ┌────────────────────────┐  │
//! │   │ Environment   │ ───▶ │ fixed + random + env   │  │
//! │   │ overrides     │      │ overrides              │  │
//! │   └───────────────┘      └────────────┬───────────┘  │
//! │                                       ▼              │
//! │                          memoized seed map           │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Precedence: a non-empty bulk list is authoritative and environment
//! overrides are skipped entirely; only the fallback path applies them.
//! The two fixed test tenants are inserted on both paths.

pub mod env_overrides;
pub mod registry;

pub use env_overrides::EnvOverrideReader;
pub use registry::TenantRegistry;

use didvault_core::SeedError;

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A seed from the environment path failed to decode. Bulk records
    /// with bad seeds are skipped individually and never surface here.
    #[error("Failed to decode tenant seed: {0}")]
    Seed(#[from] SeedError),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
