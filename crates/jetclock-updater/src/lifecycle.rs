//! Bring-up sequence and process lifecycle.
//!
//! ```text
//! Init -> SplashShown -> ConnectivityResolved -> UpdatePath  -> PortalServing -> Terminal
//!                                            \-> HotspotPath -/
//! ```
//!
//! A quit signal, the exit watchdog or a fatal error ends the run from any
//! phase. The caller turns the returned [`Termination`] into an exit code.


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jetclock_common::{ProcessState, StatusImage, UpdaterError};
use jetclock_config::resolve_port;
use jetclock_services::{
    ConnectivityService, GithubUpdater, HostSystem, HotspotConfig, HotspotService, HttpPortal,
    NmcliConnectivity, NmcliHotspot, PortalService, SystemControl, UpdateService,
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::connectivity::ConnectivityResolver;
use crate::hotspot::HotspotFallback;
use crate::signals::{Dispatcher, LifecycleSignal};
use crate::splash::SplashController;
use crate::update_task::UpdateTrigger;
use crate::watchdog;

/// GitHub repository the managed binary is released from.
pub const RELEASE_REPOSITORY: &str = "jetclock/jetclock";

/// Every timing the lifecycle depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Upper bound on one attempt to join a known network.
    pub reconnect_deadline: Duration,
    /// Readiness poll period after the UI-ready signal.
    pub ready_poll_interval: Duration,
    /// Clears the splash even if readiness never arrives.
    pub splash_watchdog: Duration,
    /// Ends the process unconditionally.
    pub exit_watchdog: Duration,
    /// Pause on the "update complete" screen before rebooting.
    pub reboot_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            reconnect_deadline: Duration::from_secs(20),
            ready_poll_interval: Duration::from_millis(300),
            splash_watchdog: Duration::from_secs(45),
            exit_watchdog: Duration::from_secs(20 * 60),
            reboot_delay: Duration::from_secs(5),
        }
    }
}

/// Inputs fixed before bring-up starts.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    /// Raw `JETCLOCK_PORT` value, if set.
    pub port_override: Option<String>,
    pub managed_binary: PathBuf,
    pub repository: String,
    /// Access point settings. The port is replaced by the resolved one.
    pub hotspot: HotspotConfig,
    pub timings: Timings,
}

/// The external collaborators.
#[derive(Clone)]
pub struct Services {
    pub connectivity: Arc<dyn ConnectivityService>,
    pub hotspot: Arc<dyn HotspotService>,
    pub updater: Arc<dyn UpdateService>,
    pub portal: Arc<dyn PortalService>,
    pub system: Arc<dyn SystemControl>,
}

impl Services {
    pub fn production() -> Self {
        Self {
            connectivity: Arc::new(NmcliConnectivity::default()),
            hotspot: Arc::new(NmcliHotspot::default()),
            updater: Arc::new(GithubUpdater::new()),
            portal: Arc::new(HttpPortal::new()),
            system: Arc::new(HostSystem),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    SplashShown,
    ConnectivityResolved,
    UpdatePath,
    HotspotPath,
    PortalServing,
    Terminal,
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// SIGINT or SIGTERM.
    Signal,
    /// The exit watchdog fired.
    Watchdog,
    /// The portal server returned.
    PortalStopped,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub reason: ExitReason,
    pub code: i32,
}

impl Termination {
    fn new(reason: ExitReason) -> Self {
        let code = match reason {
            ExitReason::Fatal => 1,
            ExitReason::Signal | ExitReason::Watchdog | ExitReason::PortalStopped => 0,
        };
        Self { reason, code }
    }
}

pub struct Lifecycle {
    settings: Settings,
    services: Services,
    splash: Arc<SplashController>,
    state: Arc<ProcessState>,
    phase: watch::Sender<Phase>,
    shutdown: CancellationToken,
}

impl Lifecycle {
    pub fn new(settings: Settings, services: Services, splash: Arc<SplashController>) -> Self {
        let (phase, _) = watch::channel(Phase::Init);
        Self {
            settings,
            services,
            splash,
            state: Arc::new(ProcessState::new()),
            phase,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> Arc<ProcessState> {
        Arc::clone(&self.state)
    }

    pub fn phases(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Run bring-up and serve until something ends the process.
    pub async fn run(self, signals: mpsc::Receiver<LifecycleSignal>) -> Termination {
        let timings = self.settings.timings.clone();
        let (exit_tx, mut exit_rx) = mpsc::channel(4);

        Dispatcher {
            state: self.state(),
            splash: Arc::clone(&self.splash),
            exit: exit_tx.clone(),
            shutdown: self.shutdown.clone(),
            poll_interval: timings.ready_poll_interval,
        }
        .spawn(signals);

        let splash = Arc::clone(&self.splash);
        watchdog::arm(
            "splash",
            timings.splash_watchdog,
            self.shutdown.clone(),
            move || async move { splash.stop_logged() },
        );
        let watchdog_exit = exit_tx.clone();
        watchdog::arm(
            "exit",
            timings.exit_watchdog,
            self.shutdown.clone(),
            move || async move {
                warn!("exit watchdog expired, shutting down");
                let _ = watchdog_exit.send(ExitReason::Watchdog).await;
            },
        );

        let termination = tokio::select! {
            Some(reason) = exit_rx.recv() => Termination::new(reason),
            result = self.bring_up() => match result {
                Ok(()) => Termination::new(ExitReason::PortalStopped),
                Err(e) if e.is_fatal() => {
                    error!("fatal: {e}");
                    Termination::new(ExitReason::Fatal)
                }
                Err(e) => {
                    error!("bring-up ended: {e}");
                    Termination::new(ExitReason::PortalStopped)
                }
            },
        };

        self.shutdown.cancel();
        self.splash.stop_logged();
        self.enter(Phase::Terminal);
        info!(reason = ?termination.reason, code = termination.code, "lifecycle finished");
        termination
    }

    async fn bring_up(&self) -> Result<(), UpdaterError> {
        let timings = &self.settings.timings;

        self.splash.show_logged(StatusImage::StartingUp);
        self.enter(Phase::SplashShown);

        info!("config location is {}", self.settings.config_path.display());
        let config = jetclock_config::load_or_default(&self.settings.config_path);
        info!(?config, "config loaded");

        let port = resolve_port(self.settings.port_override.as_deref(), config.port);
        let hotspot_config = self.settings.hotspot.clone().with_port(port);

        let online = ConnectivityResolver::new(
            Arc::clone(&self.services.connectivity),
            timings.reconnect_deadline,
        )
        .resolve(config.force_hotspot)
        .await;
        self.enter(Phase::ConnectivityResolved);

        if online {
            self.enter(Phase::UpdatePath);
            UpdateTrigger {
                updater: Arc::clone(&self.services.updater),
                system: Arc::clone(&self.services.system),
                splash: Arc::clone(&self.splash),
                state: self.state(),
                binary: self.settings.managed_binary.clone(),
                repository: self.settings.repository.clone(),
                pre_release: config.pre_release,
                reboot_delay: timings.reboot_delay,
            }
            .spawn();

            if let Err(e) = self.services.hotspot.stop().await {
                warn!("could not stop a leftover hotspot: {e}");
            }
        } else {
            self.enter(Phase::HotspotPath);
            let fallback = HotspotFallback::new(
                Arc::clone(&self.services.hotspot),
                Arc::clone(&self.splash),
                self.state(),
            );
            if !fallback.engage(&hotspot_config).await {
                warn!("offline with no hotspot, serving the portal anyway");
            }
        }

        let mut server = self.services.portal.create(&hotspot_config).await?;
        self.enter(Phase::PortalServing);
        info!(port, "portal serving");

        if let Err(e) = server.serve().await {
            error!("portal stopped: {e}");
        }
        Ok(())
    }

    fn enter(&self, phase: Phase) {
        self.phase.send_replace(phase);
    }
}
