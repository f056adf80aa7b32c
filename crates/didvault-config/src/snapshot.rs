//! The frozen configuration snapshot.
//!
//! Every field is a direct projection of one environment variable with a
//! hardcoded default. There is no layering here: tenant seeds have their
//! own precedence rules in the registry crate; this snapshot only covers
//! process-level settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Immutable process configuration.
///
/// Built once from the environment via [`AppConfig::from_env`] and then
/// shared by reference. A non-numeric `PORT` is an explicit error rather
/// than a silently propagated parse artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listen port for the hosting process.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Serve TLS with a self-signed certificate during development.
    #[serde(default)]
    pub enable_https_for_dev: bool,
    /// Emit per-request access logs.
    #[serde(default)]
    pub enable_access_logging: bool,
    /// Log level for the console writer.
    #[serde(default = "default_log_level")]
    pub console_log_level: String,
    /// Log level for file writers.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// File receiving error-level logs, if set.
    #[serde(default)]
    pub error_log_file: Option<String>,
    /// File receiving all logs, if set.
    #[serde(default)]
    pub log_all_file: Option<String>,
    /// HTTP endpoint returning the full tenant list, if configured.
    #[serde(default)]
    pub tenants_url: Option<String>,
    /// Bearer token for `tenants_url`.
    #[serde(default)]
    pub tenants_url_token: Option<String>,
    /// Redis instance holding per-tenant seed hashes, if configured.
    #[serde(default)]
    pub redis_uri: Option<String>,
    /// Source tenants from the cloud secrets manager.
    #[serde(default)]
    pub secrets_manager_enabled: bool,
    /// Name prefix selecting tenant secrets in the cloud secrets manager.
    #[serde(default = "default_secrets_tenant_prefix")]
    pub secrets_tenant_prefix: String,
    /// Test-only bypass: report every bulk source as empty so tenant
    /// resolution falls through to the environment path.
    #[serde(default)]
    pub test_mode: bool,
}

fn default_port() -> u16 {
    4006
}
fn default_log_level() -> String {
    "silly".into()
}
fn default_secrets_tenant_prefix() -> String {
    "tenant/".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            enable_https_for_dev: false,
            enable_access_logging: false,
            console_log_level: default_log_level(),
            log_level: default_log_level(),
            error_log_file: None,
            log_all_file: None,
            tenants_url: None,
            tenants_url_token: None,
            redis_uri: None,
            secrets_manager_enabled: false,
            secrets_tenant_prefix: default_secrets_tenant_prefix(),
            test_mode: false,
        }
    }
}

impl AppConfig {
    /// Builds the snapshot from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `PORT` is set but not a
    /// valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Builds the snapshot from an explicit variable set.
    ///
    /// Tests use this to avoid mutating the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `PORT` is set but not a
    /// valid port number.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = vars.into_iter().collect();

        let port = match non_empty(&env, "PORT") {
            Some(value) => value.parse().map_err(|source| ConfigError::InvalidPort {
                value: value.clone(),
                source,
            })?,
            None => default_port(),
        };

        Ok(Self {
            port,
            enable_https_for_dev: bool_var(&env, "ENABLE_HTTPS_FOR_DEV"),
            enable_access_logging: bool_var(&env, "ENABLE_ACCESS_LOGGING"),
            console_log_level: non_empty(&env, "CONSOLE_LOG_LEVEL")
                .map_or_else(default_log_level, |v| v.to_lowercase()),
            log_level: non_empty(&env, "LOG_LEVEL")
                .map_or_else(default_log_level, |v| v.to_lowercase()),
            error_log_file: non_empty(&env, "ERROR_LOG_FILE").cloned(),
            log_all_file: non_empty(&env, "LOG_ALL_FILE").cloned(),
            tenants_url: non_empty(&env, "TENANTS_API_URL").cloned(),
            tenants_url_token: non_empty(&env, "TENANTS_API_TOKEN").cloned(),
            redis_uri: non_empty(&env, "REDIS_URI").cloned(),
            secrets_manager_enabled: bool_var(&env, "TENANTS_SECRETS_MANAGER"),
            secrets_tenant_prefix: non_empty(&env, "TENANTS_SECRET_PREFIX")
                .cloned()
                .unwrap_or_else(default_secrets_tenant_prefix),
            test_mode: bool_var(&env, "TENANTS_TEST_MODE"),
        })
    }
}

/// A variable set to the empty string counts as unset.
fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a String> {
    env.get(key).filter(|v| !v.is_empty())
}

fn bool_var(env: &HashMap<String, String>, key: &str) -> bool {
    env.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
