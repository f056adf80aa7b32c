// Tracing initialization driven by the configuration snapshot, with a
// reloadable console filter.
use std::fs::OpenOptions;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

use crate::snapshot::AppConfig;

static LOG_RELOAD_HANDLE: OnceLock<ReloadHandle> = OnceLock::new();

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Initializes tracing from the snapshot's log settings.
///
/// The console writer uses `console_log_level`; `log_all_file` and
/// `error_log_file`, when set, add file writers at `log_level` and
/// `error` respectively. Safe to call more than once; later calls are
/// no-ops.
pub fn init_tracing(config: &AppConfig) {
    // Prefer RUST_LOG from env, otherwise use the configured level.
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level_for(&config.console_log_level)));

    let (console_filter, handle) = reload::Layer::new(console_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let all_file_layer = config.log_all_file.as_deref().and_then(|path| {
        file_writer(path).map(|file| {
            fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new(tracing_level_for(&config.log_level)))
        })
    });
    let error_file_layer = config.error_log_file.as_deref().and_then(|path| {
        file_writer(path).map(|file| {
            fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .with_filter(EnvFilter::new("error"))
        })
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_filter(console_filter))
        .with(all_file_layer)
        .with(error_file_layer)
        .try_init();
}

/// Apply a new console logging level at runtime if the reload handle is
/// configured.
pub fn apply_logging_level(level: &str) {
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(tracing_level_for(level));
        });
    }
}

/// Maps winston-style level names from the environment onto tracing
/// levels. Unknown names fall back to `info`.
fn tracing_level_for(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "silly" | "trace" => "trace",
        "verbose" | "debug" => "debug",
        "http" | "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn file_writer(path: &str) -> Option<std::fs::File> {
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Failed to open log file {path}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_winston_levels() {
        assert_eq!(tracing_level_for("silly"), "trace");
        assert_eq!(tracing_level_for("VERBOSE"), "debug");
        assert_eq!(tracing_level_for("http"), "info");
        assert_eq!(tracing_level_for("warn"), "warn");
        assert_eq!(tracing_level_for("made-up"), "info");
    }

    #[test]
    fn file_writer_reports_unopenable_paths() {
        assert!(file_writer("/nonexistent-dir/didvault-test.log").is_none());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("all.log");
        let cfg = AppConfig {
            log_all_file: Some(log.to_string_lossy().into_owned()),
            ..AppConfig::default()
        };
        init_tracing(&cfg);
        init_tracing(&cfg);
        apply_logging_level("debug");
    }
}
