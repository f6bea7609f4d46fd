//! On-device settings file schema.

use serde::Deserialize;

/// Settings read once at startup and immutable afterwards.
///
/// Keys use the PascalCase spelling the device config has always used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AppConfig {
    /// Skip the connectivity probe and go straight to hotspot mode.
    pub force_hotspot: bool,
    /// Follow the pre-release update channel.
    pub pre_release: bool,
    /// Portal server port. `JETCLOCK_PORT` takes precedence.
    pub port: Option<u16>,
}
