//! NetworkManager-backed access point.

use async_trait::async_trait;
use jetclock_common::HotspotError;
use tracing::{debug, info};

use crate::command::{self, CommandOutput};
use crate::HotspotService;

/// nmcli exit code for "connection, device or access point does not exist".
const NMCLI_NOT_FOUND: i32 = 10;

/// Access point and portal settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotConfig {
    pub interface: String,
    pub ssid: String,
    pub password: String,
    /// Port the captive portal listens on.
    pub port: u16,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".into(),
            ssid: "JetClock-Setup".into(),
            password: "jetclock".into(),
            port: 80,
        }
    }
}

impl HotspotConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Hotspot driven through an nmcli connection profile.
pub struct NmcliHotspot {
    connection: String,
}

impl NmcliHotspot {
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
        }
    }

    fn start_args(&self, config: &HotspotConfig) -> Vec<String> {
        [
            "device",
            "wifi",
            "hotspot",
            "ifname",
            config.interface.as_str(),
            "con-name",
            self.connection.as_str(),
            "ssid",
            config.ssid.as_str(),
            "password",
            config.password.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn stop_args(&self) -> Vec<String> {
        vec![
            "connection".to_string(),
            "down".to_string(),
            self.connection.clone(),
        ]
    }
}

impl Default for NmcliHotspot {
    fn default() -> Self {
        Self::new("jetclock-hotspot")
    }
}

/// Whether a failed `connection down` just means nothing was up.
fn already_down(output: &CommandOutput) -> bool {
    if output.code == Some(NMCLI_NOT_FOUND) {
        return true;
    }
    let message = output.message().to_ascii_lowercase();
    message.contains("not an active connection") || message.contains("unknown connection")
}

#[async_trait]
impl HotspotService for NmcliHotspot {
    async fn stop(&self) -> Result<(), HotspotError> {
        let output = command::run("nmcli", &self.stop_args())
            .await
            .map_err(|e| HotspotError::StopFailed(format!("failed to run nmcli: {e}")))?;

        if output.success() {
            info!(connection = %self.connection, "hotspot stopped");
            Ok(())
        } else if already_down(&output) {
            debug!(connection = %self.connection, "hotspot was not running");
            Ok(())
        } else {
            Err(HotspotError::StopFailed(output.message().to_string()))
        }
    }

    async fn start(&self, config: &HotspotConfig) -> Result<(), HotspotError> {
        let output = command::run("nmcli", &self.start_args(config))
            .await
            .map_err(|e| HotspotError::StartFailed(format!("failed to run nmcli: {e}")))?;

        if output.success() {
            info!(ssid = %config.ssid, interface = %config.interface, "hotspot started");
            Ok(())
        } else {
            Err(HotspotError::StartFailed(output.message().to_string()))
        }
    }
}
