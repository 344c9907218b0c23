//! Tracing initialization for hosts embedding the middleware.
//!
//! Console output is always on. A log file is optional; when given, it receives the same events
//! without ANSI colors so it stays grep-able.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::error::{MemosError, Result};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `MemosConfig::log_level`) is used as
/// the filter. Fails if the filter does not parse, the log file cannot be opened, or a global
/// subscriber is already installed.
pub fn init_tracing(log_file: Option<&str>, default_level: &str) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), default_level)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_level(true);

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(Path::new(path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_thread_ids(true),
            )
        }
        None => None,
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| MemosError::Logging(format!("failed to set global subscriber: {e}")))
}

/// `rust_log` takes priority over `default_level`; blank values count as unset.
fn build_filter(rust_log: Option<&str>, default_level: &str) -> Result<EnvFilter> {
    let directives = rust_log
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_level);
    EnvFilter::try_new(directives)
        .map_err(|e| MemosError::Logging(format!("invalid log filter {directives:?}: {e}")))
}

/// Opens `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Arc::new(file))
}
