//! External collaborators of the JetClock bring-up orchestrator.
//!
//! Each collaborator is a trait so the orchestrator can be driven by fakes
//! in tests. The production implementations are thin wrappers around
//! `nmcli`, `feh`, the GitHub Releases API and a small TCP listener:
//! - [`NmcliConnectivity`]: internet probe and reconnect to known networks
//! - [`NmcliHotspot`]: local access point
//! - [`GithubUpdater`]: release check and binary replacement
//! - [`HttpPortal`]: captive-portal landing server
//! - [`FehViewer`]: full-screen status image viewer
//! - [`HostSystem`]: reboot and version query

mod command;
pub mod connectivity;
pub mod display;
pub mod hotspot;
pub mod portal;
pub mod system;
pub mod update;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use jetclock_common::{
    ConnectivityError, DisplayError, HotspotError, PortalError, SystemError, UpdateError,
};

pub use connectivity::NmcliConnectivity;
pub use display::{FehViewer, StopSignal};
pub use hotspot::{HotspotConfig, NmcliHotspot};
pub use portal::{HttpPortal, PortalListener};
pub use system::HostSystem;
pub use update::{GithubUpdater, Release, UpdateRequest};

/// Internet reachability and reconnection.
#[async_trait]
pub trait ConnectivityService: Send + Sync {
    /// Fast check of the current connection. No side effects.
    async fn has_internet(&self) -> bool;

    /// Try once to join a previously known network within `deadline`.
    ///
    /// Only returns `Ok` after internet access has been verified.
    async fn connect_known(&self, deadline: Duration) -> Result<(), ConnectivityError>;
}

/// The local wireless access point.
#[async_trait]
pub trait HotspotService: Send + Sync {
    /// Bring the access point down. Succeeds when nothing is running.
    async fn stop(&self) -> Result<(), HotspotError>;

    async fn start(&self, config: &HotspotConfig) -> Result<(), HotspotError>;
}

/// Remote release channel for the managed application.
#[async_trait]
pub trait UpdateService: Send + Sync {
    /// Look for a release newer than `request.current_version`.
    async fn check(&self, request: &UpdateRequest) -> Result<Option<Release>, UpdateError>;

    /// Download `release` and replace the managed binary with it.
    async fn install(&self, request: &UpdateRequest, release: &Release)
        -> Result<(), UpdateError>;
}

/// Builds the captive-portal server.
#[async_trait]
pub trait PortalService: Send + Sync {
    async fn create(&self, config: &HotspotConfig) -> Result<Box<dyn PortalServer>, PortalError>;
}

/// A constructed portal server.
#[async_trait]
pub trait PortalServer: Send {
    /// Serve until the server fails. Does not return under normal operation.
    async fn serve(&mut self) -> Result<(), PortalError>;
}

/// OS-level operations.
#[async_trait]
pub trait SystemControl: Send + Sync {
    async fn reboot(&self) -> Result<(), SystemError>;

    /// Version string reported by `binary --version`, if any.
    async fn installed_version(&self, binary: &Path) -> Option<String>;
}

/// Launches and terminates the external full-screen image viewer.
pub trait Viewer: Send + Sync {
    /// Start the viewer on `image` and return its process id.
    fn launch(&self, image: &Path) -> Result<u32, DisplayError>;

    /// Signal `pid`. A process that is already gone is not an error.
    fn terminate(&self, pid: u32, signal: StopSignal) -> Result<(), DisplayError>;
}
