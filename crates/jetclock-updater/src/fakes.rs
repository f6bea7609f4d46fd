//! In-memory collaborators that record how the orchestrator drives them.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jetclock_common::{
    ConnectivityError, DisplayError, HotspotError, PortalError, StatusImage, SystemError,
    UpdateError,
};
use jetclock_platform::{ImageSet, PidFile};
use jetclock_services::{
    ConnectivityService, HotspotConfig, HotspotService, PortalServer, PortalService, Release,
    StopSignal, SystemControl, UpdateRequest, UpdateService, Viewer,
};

use crate::splash::SplashController;

/// A splash controller whose pidfile and images live under `dir`.
pub fn splash_in(dir: &Path, viewer: Arc<FakeViewer>) -> Arc<SplashController> {
    let images = dir.join("images");
    std::fs::create_dir_all(&images).unwrap();
    for kind in StatusImage::ALL {
        std::fs::write(images.join(kind.file_name()), b"png").unwrap();
    }
    Arc::new(SplashController::new(
        viewer,
        PidFile::new(dir.join("splash.pid")),
        ImageSet::new(images),
    ))
}

#[derive(Default)]
pub struct FakeViewer {
    next_pid: AtomicU32,
    fail_launch: AtomicBool,
    launched: Mutex<Vec<(u32, PathBuf)>>,
    signals: Mutex<Vec<(u32, StopSignal)>>,
}

impl FakeViewer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_pid: AtomicU32::new(4000),
            ..Self::default()
        })
    }

    pub fn fail_launches(&self) {
        self.fail_launch.store(true, Ordering::SeqCst);
    }

    pub fn launches(&self) -> Vec<PathBuf> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|(_, path)| path.clone())
            .collect()
    }

    /// File names of every image shown, in order.
    pub fn shown(&self) -> Vec<String> {
        self.launches()
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    pub fn last_pid(&self) -> Option<u32> {
        self.launched.lock().unwrap().last().map(|(pid, _)| *pid)
    }

    pub fn signals(&self) -> Vec<(u32, StopSignal)> {
        self.signals.lock().unwrap().clone()
    }

    pub fn was_killed(&self, pid: u32) -> bool {
        self.signals()
            .contains(&(pid, StopSignal::Forceful))
    }
}

impl Viewer for FakeViewer {
    fn launch(&self, image: &Path) -> Result<u32, DisplayError> {
        if self.fail_launch.load(Ordering::SeqCst) {
            return Err(DisplayError::Launch("viewer unavailable".into()));
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.launched
            .lock()
            .unwrap()
            .push((pid, image.to_path_buf()));
        Ok(pid)
    }

    fn terminate(&self, pid: u32, signal: StopSignal) -> Result<(), DisplayError> {
        self.signals.lock().unwrap().push((pid, signal));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Reconnect {
    Succeed,
    Fail,
    Hang,
}

pub struct FakeConnectivity {
    online: bool,
    reconnect: Reconnect,
    pub probes: AtomicUsize,
    pub reconnects: AtomicUsize,
}

impl FakeConnectivity {
    pub fn online() -> Arc<Self> {
        Self::with(true, Reconnect::Fail)
    }

    pub fn offline(reconnect: Reconnect) -> Arc<Self> {
        Self::with(false, reconnect)
    }

    fn with(online: bool, reconnect: Reconnect) -> Arc<Self> {
        Arc::new(Self {
            online,
            reconnect,
            probes: AtomicUsize::new(0),
            reconnects: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ConnectivityService for FakeConnectivity {
    async fn has_internet(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.online
    }

    async fn connect_known(&self, _deadline: Duration) -> Result<(), ConnectivityError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        match self.reconnect {
            Reconnect::Succeed => Ok(()),
            Reconnect::Fail => Err(ConnectivityError::ReconnectFailed("no known network".into())),
            Reconnect::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub struct FakeHotspot {
    fail_start: bool,
    fail_stop: bool,
    calls: Mutex<Vec<&'static str>>,
    started_with: Mutex<Option<HotspotConfig>>,
}

impl FakeHotspot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_start() -> Arc<Self> {
        Arc::new(Self {
            fail_start: true,
            ..Self::default()
        })
    }

    pub fn failing_stop() -> Arc<Self> {
        Arc::new(Self {
            fail_stop: true,
            ..Self::default()
        })
    }

    /// "stop" and "start" in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn started_with(&self) -> Option<HotspotConfig> {
        self.started_with.lock().unwrap().clone()
    }
}

#[async_trait]
impl HotspotService for FakeHotspot {
    async fn stop(&self) -> Result<(), HotspotError> {
        self.calls.lock().unwrap().push("stop");
        if self.fail_stop {
            return Err(HotspotError::StopFailed("nmcli busy".into()));
        }
        Ok(())
    }

    async fn start(&self, config: &HotspotConfig) -> Result<(), HotspotError> {
        self.calls.lock().unwrap().push("start");
        *self.started_with.lock().unwrap() = Some(config.clone());
        if self.fail_start {
            return Err(HotspotError::StartFailed("no wireless device".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    UpToDate,
    Available,
    Fail,
    Panic,
}

pub struct FakeUpdater {
    check: Check,
    fail_install: bool,
    pub installs: AtomicUsize,
    requests: Mutex<Vec<UpdateRequest>>,
}

impl FakeUpdater {
    pub fn new(check: Check) -> Arc<Self> {
        Self::with(check, false)
    }

    pub fn failing_install() -> Arc<Self> {
        Self::with(Check::Available, true)
    }

    fn with(check: Check, fail_install: bool) -> Arc<Self> {
        Arc::new(Self {
            check,
            fail_install,
            installs: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<UpdateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn release() -> Release {
        Release {
            tag: "v2.0.0".into(),
            asset_name: "jetclock-linux-arm64".into(),
            download_url: "https://downloads.test/jetclock".into(),
        }
    }
}

#[async_trait]
impl UpdateService for FakeUpdater {
    async fn check(&self, request: &UpdateRequest) -> Result<Option<Release>, UpdateError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.check {
            Check::UpToDate => Ok(None),
            Check::Available => Ok(Some(Self::release())),
            Check::Fail => Err(UpdateError::Check("release server unreachable".into())),
            Check::Panic => panic!("release metadata exploded"),
        }
    }

    async fn install(&self, _request: &UpdateRequest, _release: &Release) -> Result<(), UpdateError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.fail_install {
            return Err(UpdateError::Apply("checksum mismatch".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Serve {
    Forever,
    Stops,
}

pub struct FakePortal {
    fail_create: bool,
    serve: Serve,
    created_with: Mutex<Option<HotspotConfig>>,
}

impl FakePortal {
    pub fn serving() -> Arc<Self> {
        Self::with(false, Serve::Forever)
    }

    pub fn stopping() -> Arc<Self> {
        Self::with(false, Serve::Stops)
    }

    pub fn failing_create() -> Arc<Self> {
        Self::with(true, Serve::Forever)
    }

    fn with(fail_create: bool, serve: Serve) -> Arc<Self> {
        Arc::new(Self {
            fail_create,
            serve,
            created_with: Mutex::new(None),
        })
    }

    pub fn created_with(&self) -> Option<HotspotConfig> {
        self.created_with.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortalService for FakePortal {
    async fn create(&self, config: &HotspotConfig) -> Result<Box<dyn PortalServer>, PortalError> {
        *self.created_with.lock().unwrap() = Some(config.clone());
        if self.fail_create {
            return Err(PortalError::Create(format!("port {} in use", config.port)));
        }
        Ok(Box::new(FakeServer { serve: self.serve }))
    }
}

struct FakeServer {
    serve: Serve,
}

#[async_trait]
impl PortalServer for FakeServer {
    async fn serve(&mut self) -> Result<(), PortalError> {
        match self.serve {
            Serve::Forever => std::future::pending().await,
            Serve::Stops => Err(PortalError::Serve("listener closed".into())),
        }
    }
}

pub struct FakeSystem {
    version: Option<String>,
    pub reboots: AtomicUsize,
}

impl FakeSystem {
    pub fn with_version(version: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            version: version.map(str::to_string),
            reboots: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SystemControl for FakeSystem {
    async fn reboot(&self) -> Result<(), SystemError> {
        self.reboots.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn installed_version(&self, _binary: &Path) -> Option<String> {
        self.version.clone()
    }
}
