//! Config validation.
//!
//! Collects every problem into a single `ConfigError` so one log line
//! describes the whole file.

use crate::schema::AppConfig;
use jetclock_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.port == Some(0) {
        errors.push("Port = 0 is not a usable port".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Reset invalid fields to their defaults, keeping everything else.
pub fn sanitize(mut config: AppConfig) -> AppConfig {
    if config.port == Some(0) {
        config.port = None;
    }
    config
}
