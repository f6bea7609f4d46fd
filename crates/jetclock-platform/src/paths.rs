//! Well-known filesystem locations on the appliance.

use std::path::{Path, PathBuf};

/// Environment variable overriding the device home directory.
pub const HOME_ENV_VAR: &str = "JETCLOCK_HOME";

const FALLBACK_HOME: &str = "/home/jetclock";
const SPLASH_PID_FILE: &str = "jetclock-splash.pid";

/// Resolved on-device paths, all rooted at one home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    home: PathBuf,
}

impl Paths {
    /// Resolve the home directory: `$JETCLOCK_HOME`, then the user's home,
    /// then `/home/jetclock`.
    pub fn resolve() -> Self {
        let home = std::env::var_os(HOME_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_HOME));
        Self { home }
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `<home>/.config/jetclock/config.yaml`
    pub fn config_file(&self) -> PathBuf {
        self.home
            .join(".config")
            .join("jetclock")
            .join("config.yaml")
    }

    /// `<home>/.jetclock`, where the managed application lives.
    pub fn app_dir(&self) -> PathBuf {
        self.home.join(".jetclock")
    }

    /// The managed application binary that gets updated.
    pub fn managed_binary(&self) -> PathBuf {
        self.app_dir().join("jetclock")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.app_dir().join("images")
    }

    pub fn crash_report_dir(&self) -> PathBuf {
        self.app_dir().join("crash-reports")
    }

    pub fn log_file(&self) -> PathBuf {
        self.home.join("jetclock-updater.log")
    }

    /// PID-file of the active splash viewer. Lives in the temp directory so
    /// a reboot clears it.
    pub fn splash_pid_file(&self) -> PathBuf {
        std::env::temp_dir().join(SPLASH_PID_FILE)
    }
}
