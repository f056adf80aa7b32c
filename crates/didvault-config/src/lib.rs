//! Configuration for the DIDVault tenant provisioning service.
//!
//! This crate projects process environment variables into an immutable
//! [`AppConfig`] snapshot and owns the process-wide [`ConfigStore`] that
//! holds it:
//!
//! - [`AppConfig`] - frozen view of ports, log levels, and tenant-source
//!   settings, computed once
//! - [`ConfigStore`] - lazy, resettable holder for the snapshot (reset
//!   exists for test isolation only)
//! - [`observability`] - tracing initialization driven by the snapshot's
//!   log settings

pub mod observability;
pub mod snapshot;
pub mod store;

pub use snapshot::AppConfig;
pub use store::{ConfigStore, get_config, reset_config, set_config};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` was set but is not a valid TCP port number.
    #[error("Invalid PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
