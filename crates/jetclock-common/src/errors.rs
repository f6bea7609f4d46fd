use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to launch viewer: {0}")]
    Launch(String),

    #[error("pid file error at {path}: {source}")]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to signal viewer {pid}: {reason}")]
    Signal { pid: u32, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    #[error("reconnect timed out after {0:?}")]
    Timeout(Duration),

    #[error("reconnect failed: {0}")]
    ReconnectFailed(String),

    #[error("connected but internet is unreachable")]
    NoInternet,
}

#[derive(Debug, thiserror::Error)]
pub enum HotspotError {
    #[error("hotspot start failed: {0}")]
    StartFailed(String),

    #[error("hotspot stop failed: {0}")]
    StopFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("update check failed: {0}")]
    Check(String),

    #[error("update apply failed: {0}")]
    Apply(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("failed to create portal server: {0}")]
    Create(String),

    #[error("portal server error: {0}")]
    Serve(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("reboot failed: {0}")]
    Reboot(String),
}

#[derive(Debug, thiserror::Error)]
pub enum UpdaterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Connectivity(#[from] ConnectivityError),

    #[error(transparent)]
    Hotspot(#[from] HotspotError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    System(#[from] SystemError),
}

impl UpdaterError {
    /// Whether this error must end the process.
    ///
    /// Everything except failing to construct the portal server is
    /// logged and survived.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UpdaterError::Portal(PortalError::Create(_)))
    }
}
