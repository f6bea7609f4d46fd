//! NetworkManager-backed connectivity.

use std::time::Duration;

use async_trait::async_trait;
use jetclock_common::ConnectivityError;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::command;
use crate::ConnectivityService;

const DEFAULT_PROBE_URL: &str = "http://connectivitycheck.gstatic.com/generate_204";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const VERIFY_INTERVAL: Duration = Duration::from_secs(1);

/// Connectivity via `nmcli` plus an HTTP reachability probe.
pub struct NmcliConnectivity {
    interface: String,
    probe_url: String,
    http: reqwest::Client,
}

impl NmcliConnectivity {
    pub fn new(interface: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            interface: interface.into(),
            probe_url: DEFAULT_PROBE_URL.to_string(),
            http,
        }
    }

    pub fn with_probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = url.into();
        self
    }

    fn connect_args(&self, deadline: Duration) -> Vec<String> {
        let wait = deadline.as_secs().max(1);
        vec![
            "--wait".to_string(),
            wait.to_string(),
            "device".to_string(),
            "connect".to_string(),
            self.interface.clone(),
        ]
    }
}

impl Default for NmcliConnectivity {
    fn default() -> Self {
        Self::new("wlan0")
    }
}

#[async_trait]
impl ConnectivityService for NmcliConnectivity {
    async fn has_internet(&self) -> bool {
        match self.http.get(&self.probe_url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!(status = %response.status(), ok, "connectivity probe");
                ok
            }
            Err(e) => {
                debug!("connectivity probe failed: {e}");
                false
            }
        }
    }

    async fn connect_known(&self, deadline: Duration) -> Result<(), ConnectivityError> {
        let started = Instant::now();

        let output = command::run("nmcli", &self.connect_args(deadline))
            .await
            .map_err(|e| ConnectivityError::ReconnectFailed(format!("failed to run nmcli: {e}")))?;
        if !output.success() {
            return Err(ConnectivityError::ReconnectFailed(
                output.message().to_string(),
            ));
        }
        info!(interface = %self.interface, "joined a known network, verifying internet");

        loop {
            if self.has_internet().await {
                return Ok(());
            }
            if started.elapsed() >= deadline {
                warn!("associated with a network but internet is unreachable");
                return Err(ConnectivityError::NoInternet);
            }
            tokio::time::sleep(VERIFY_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_args_pass_deadline_as_wait() {
        let conn = NmcliConnectivity::new("wlan1");
        assert_eq!(
            conn.connect_args(Duration::from_secs(20)),
            vec!["--wait", "20", "device", "connect", "wlan1"]
        );
    }

    #[test]
    fn sub_second_deadline_waits_at_least_one_second() {
        let conn = NmcliConnectivity::default();
        let args = conn.connect_args(Duration::from_millis(200));
        assert_eq!(args[1], "1");
        assert_eq!(args[4], "wlan0");
    }

    #[tokio::test]
    async fn unreachable_probe_reports_offline() {
        let conn = NmcliConnectivity::default().with_probe_url("http://127.0.0.1:9/generate_204");
        assert!(!conn.has_internet().await);
    }
}
