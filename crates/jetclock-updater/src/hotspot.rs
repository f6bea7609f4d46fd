//! Hotspot fallback for devices that could not get online.

use std::sync::Arc;

use jetclock_common::{ProcessState, StatusImage};
use jetclock_services::{HotspotConfig, HotspotService};
use tracing::{error, info, warn};

use crate::splash::SplashController;

pub struct HotspotFallback {
    hotspot: Arc<dyn HotspotService>,
    splash: Arc<SplashController>,
    state: Arc<ProcessState>,
}

impl HotspotFallback {
    pub fn new(
        hotspot: Arc<dyn HotspotService>,
        splash: Arc<SplashController>,
        state: Arc<ProcessState>,
    ) -> Self {
        Self {
            hotspot,
            splash,
            state,
        }
    }

    /// Show the hotspot screen and bring the access point up from a clean
    /// slate. Returns whether the hotspot is running.
    pub async fn engage(&self, config: &HotspotConfig) -> bool {
        self.splash.show_logged(StatusImage::HotspotMode);

        if let Err(e) = self.hotspot.stop().await {
            warn!("could not clear a previous hotspot: {e}");
        }

        match self.hotspot.start(config).await {
            Ok(()) => {
                self.state.mark_in_hotspot();
                info!(ssid = %config.ssid, "hotspot running");
                true
            }
            Err(e) => {
                error!("failed to start hotspot: {e}");
                warn!("continuing without a hotspot; the portal is only reachable on existing links");
                false
            }
        }
    }
}
