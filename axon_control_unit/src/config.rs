//! Control-unit configuration loading.
//!
//! One TOML file deserialized into [`ControlUnitConfig`] through
//! [`ConfigLoader`], then validated. A missing file is not an error for the
//! binary: it runs on defaults, which [`render_config`] can print.

use std::path::Path;

use axon_common::config::{ConfigError, ConfigLoader};
use axon_common::control_unit::config::ControlUnitConfig;
use tracing::info;

/// Load and validate the configuration file.
pub fn load_config(path: &Path) -> Result<ControlUnitConfig, ConfigError> {
    let cfg = ControlUnitConfig::load(path)?;
    cfg.validate()?;
    info!(path = %path.display(), "Configuration loaded");
    Ok(cfg)
}

/// Load from an in-memory TOML document (tests, embedded defaults).
pub fn load_config_from_str(text: &str) -> Result<ControlUnitConfig, ConfigError> {
    let cfg = ControlUnitConfig::from_toml(text)?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if given, otherwise defaults. `store_dir` overrides the
/// file's value.
pub fn resolve_config(
    path: Option<&Path>,
    store_dir: Option<&Path>,
) -> Result<ControlUnitConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) => load_config(p)?,
        None => {
            info!("No configuration file given, using defaults");
            ControlUnitConfig::default()
        }
    };
    if let Some(dir) = store_dir {
        cfg.store_dir = dir.display().to_string();
        cfg.validate()?;
    }
    Ok(cfg)
}

/// Pretty TOML of a configuration.
pub fn render_config(cfg: &ControlUnitConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(cfg).map_err(|e| ConfigError::ParseError(e.to_string()))
}

// ─── Tests ──────────────────────────────────────────────────────────
