//! Logging setup.
//!
//! The terminal is owned by the TUI, so logs go to a file. `SEQVIEW_LOG`
//! overrides the level given on the command line with any `EnvFilter`
//! directive string.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "SEQVIEW_LOG";

/// Builds the filter from `SEQVIEW_LOG`, falling back to `level`.
pub fn create_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {} value: {}", LOG_ENV, directives));
    }
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {}", level))
}

/// A fresh log file name in the system temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("seqview-{:08x}.log", rand::random::<u32>()))
}

/// Installs the global subscriber, writing to `path`.
pub fn init_file_logging(path: &Path, level: &str) -> Result<()> {
    let filter = create_env_filter(level)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
