//! Core YAML config loading.

use crate::schema::AppConfig;
use crate::validation;
use jetclock_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

/// Load config from a specific YAML file path.
///
/// Missing fields use serde defaults. If validation fails, a warning is
/// logged and the offending fields are reset to their defaults.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };

    let config: AppConfig = if content.trim().is_empty() {
        AppConfig::default()
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse YAML: {e}")))?
    };

    let config = match validation::validate(&config) {
        Ok(()) => config,
        Err(e) => {
            warn!("config validation warning: {e}; resetting invalid fields to defaults");
            validation::sanitize(config)
        }
    };

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config, falling back to defaults on any error.
///
/// A load failure is never fatal for the updater; it is logged and the
/// device proceeds with [`AppConfig::default`].
pub fn load_or_default(path: &Path) -> AppConfig {
    match load_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("could not load config, using defaults: {e}");
            AppConfig::default()
        }
    }
}
