//! Tracing setup. The terminal belongs to the UI, so diagnostics go to a file.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a global subscriber writing to `path`. Level comes from
/// `RUST_LOG`, defaulting to `info`. Returns `false` if a subscriber was
/// already installed.
pub fn init_file_tracing(path: &Path) -> Result<bool> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok();

    Ok(installed)
}
