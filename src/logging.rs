use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use aura_core::Config;
use tracing_subscriber::EnvFilter;

/// Default log location, next to the config file
pub fn default_log_path() -> Result<PathBuf> {
    Ok(Config::get_config_dir()?.join("aura.log"))
}

/// Send tracing output to `path`.
///
/// The TUI owns the terminal, so logs never go to stderr. `RUST_LOG` picks
/// the level and defaults to `info`.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))
}
