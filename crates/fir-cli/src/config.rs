//! Configuration lookup.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use fir_core::FirConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fir-ocr")
        .join("config.json")
}

/// Load configuration: explicit path, then the default location, then
/// built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<FirConfig> {
    if let Some(path) = explicit {
        debug!("Loading config from {}", path.display());
        return FirConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        return FirConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    debug!("No config file found, using defaults");
    Ok(FirConfig::default())
}
