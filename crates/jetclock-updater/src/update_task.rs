//! Background update of the managed JetClock binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jetclock_common::{ProcessState, StatusImage};
use jetclock_services::{SystemControl, UpdateRequest, UpdateService};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::splash::SplashController;

/// Assumed installed version when the binary cannot report one.
pub const FALLBACK_VERSION: &str = "v0.0.1";

/// How an update attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Failed,
    UpToDate,
    /// Installed, and a reboot was requested.
    Applied,
}

pub struct UpdateTrigger {
    pub updater: Arc<dyn UpdateService>,
    pub system: Arc<dyn SystemControl>,
    pub splash: Arc<SplashController>,
    pub state: Arc<ProcessState>,
    pub binary: PathBuf,
    pub repository: String,
    pub pre_release: bool,
    pub reboot_delay: Duration,
}

impl UpdateTrigger {
    pub fn spawn(self) -> JoinHandle<UpdateOutcome> {
        tokio::spawn(async move { self.run().await })
    }

    /// Check for a new release and install it.
    ///
    /// `update_finished` is raised exactly once when this returns, and also
    /// when it unwinds.
    pub async fn run(&self) -> UpdateOutcome {
        let _finished = FinishedOnDrop(&self.state);

        let current_version = match self.system.installed_version(&self.binary).await {
            Some(version) => version,
            None => {
                warn!(
                    binary = %self.binary.display(),
                    "could not read installed version, assuming {FALLBACK_VERSION}"
                );
                FALLBACK_VERSION.to_string()
            }
        };
        info!(version = %current_version, "starting update process");

        let request = UpdateRequest {
            binary: self.binary.clone(),
            current_version,
            repository: self.repository.clone(),
            pre_release: self.pre_release,
        };

        let release = match self.updater.check(&request).await {
            Ok(Some(release)) => release,
            Ok(None) => {
                info!("no update available");
                return UpdateOutcome::UpToDate;
            }
            Err(e) => {
                error!("update failed: {e}");
                return UpdateOutcome::Failed;
            }
        };

        info!(tag = %release.tag, "update available");
        self.splash.show_logged(StatusImage::UpdateStarting);

        if let Err(e) = self.updater.install(&request, &release).await {
            error!("update failed: {e}");
            self.splash.stop_logged();
            return UpdateOutcome::Failed;
        }

        info!(tag = %release.tag, "update applied, rebooting in {:?}", self.reboot_delay);
        self.splash.show_logged(StatusImage::UpdateComplete);
        tokio::time::sleep(self.reboot_delay).await;

        if let Err(e) = self.system.reboot().await {
            error!("reboot after update failed: {e}");
        }
        UpdateOutcome::Applied
    }
}

struct FinishedOnDrop<'a>(&'a ProcessState);

impl Drop for FinishedOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.mark_update_finished() {
            debug!("update task finished");
        }
    }
}
