// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{AssetpipeError, Result};

/// Upper bound for `[watch].delay_ms`; anything larger makes the watcher
/// look dead.
const MAX_WATCH_DELAY_MS: u64 = 60_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = AssetpipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_styles(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.host.trim().is_empty() {
        return Err(AssetpipeError::ConfigError(
            "[server].host must not be empty".to_string(),
        ));
    }
    if cfg.server.dev_port == 0 {
        return Err(AssetpipeError::ConfigError(
            "[server].dev_port must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.server.deploy_port == 0 {
        return Err(AssetpipeError::ConfigError(
            "[server].deploy_port must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_styles(cfg: &RawConfigFile) -> Result<()> {
    if let Some(idx) = cfg
        .styles
        .load_paths
        .iter()
        .position(|p| p.trim().is_empty())
    {
        return Err(AssetpipeError::ConfigError(format!(
            "[styles].load_paths[{idx}] must not be empty"
        )));
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.delay_ms > MAX_WATCH_DELAY_MS {
        return Err(AssetpipeError::ConfigError(format!(
            "[watch].delay_ms must be <= {MAX_WATCH_DELAY_MS} (got {})",
            cfg.watch.delay_ms
        )));
    }
    Ok(())
}
