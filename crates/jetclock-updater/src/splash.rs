//! Splash controller: at most one full-screen status image at a time.
//!
//! The viewer runs as a separate process tracked through a pidfile, so a
//! later run (or `--reboot`) can still find and stop it. Show and stop are
//! serialized by an in-process lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use jetclock_common::{DisplayError, StatusImage};
use jetclock_platform::pidfile::PidRecord;
use jetclock_platform::{ImageSet, PidFile};
use jetclock_services::{StopSignal, Viewer};
use tracing::{debug, info, warn};

/// Result of a successful [`SplashController::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { pid: u32 },
    NotRunning,
}

pub struct SplashController {
    viewer: Arc<dyn Viewer>,
    pid_file: PidFile,
    images: ImageSet,
    lock: Mutex<()>,
}

impl SplashController {
    pub fn new(viewer: Arc<dyn Viewer>, pid_file: PidFile, images: ImageSet) -> Self {
        Self {
            viewer,
            pid_file,
            images,
            lock: Mutex::new(()),
        }
    }

    /// Replace whatever is on screen with `kind`.
    pub fn show(&self, kind: StatusImage) -> Result<(), DisplayError> {
        let _guard = self.lock();
        self.stop_locked()?;

        let image = self.images.path_for(kind);
        let pid = self.viewer.launch(&image)?;
        if let Err(e) = self.pid_file.write(pid) {
            // An untracked viewer could never be stopped again.
            let _ = self.viewer.terminate(pid, StopSignal::Forceful);
            return Err(self.pid_error(e));
        }

        info!(image = %kind, pid, "splash shown");
        Ok(())
    }

    /// [`show`](Self::show), logging instead of returning failures.
    pub fn show_logged(&self, kind: StatusImage) {
        if let Err(e) = self.show(kind) {
            warn!("could not show {kind} splash: {e}");
        }
    }

    /// Take down the current image. Stopping twice is not an error.
    pub fn stop(&self) -> Result<StopOutcome, DisplayError> {
        let _guard = self.lock();
        self.stop_locked()
    }

    pub fn stop_logged(&self) {
        match self.stop() {
            Ok(StopOutcome::Stopped { pid }) => info!(pid, "splash stopped"),
            Ok(StopOutcome::NotRunning) => debug!("no splash to stop"),
            Err(e) => warn!("failed to stop splash: {e}"),
        }
    }

    /// Stop from inside a panic hook without blocking.
    ///
    /// The panicking thread may itself hold the splash lock, so a busy lock
    /// skips the stop. Returns whether the stop ran.
    pub fn stop_from_panic_hook(&self) -> bool {
        let _guard = match self.lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return false,
        };
        if let Err(e) = self.stop_locked() {
            warn!("failed to stop splash after panic: {e}");
        }
        true
    }

    /// Whether a viewer is currently tracked.
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        matches!(self.pid_file.read(), Ok(Some(PidRecord::Pid(_))))
    }

    fn stop_locked(&self) -> Result<StopOutcome, DisplayError> {
        let pid = match self.pid_file.read().map_err(|e| self.pid_error(e))? {
            None => return Ok(StopOutcome::NotRunning),
            Some(PidRecord::Corrupt) => {
                warn!(path = %self.pid_file.path().display(), "discarding unreadable splash pidfile");
                self.pid_file.remove().map_err(|e| self.pid_error(e))?;
                return Ok(StopOutcome::NotRunning);
            }
            Some(PidRecord::Pid(pid)) => pid,
        };

        if let Err(e) = self.viewer.terminate(pid, StopSignal::Graceful) {
            debug!(pid, "graceful stop failed: {e}");
        }
        let forced = self.viewer.terminate(pid, StopSignal::Forceful);
        self.pid_file.remove().map_err(|e| self.pid_error(e))?;
        forced?;

        Ok(StopOutcome::Stopped { pid })
    }

    fn pid_error(&self, source: std::io::Error) -> DisplayError {
        DisplayError::PidFile {
            path: self.pid_file.path().to_path_buf(),
            source,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stops the splash when dropped, covering every exit path out of `main`.
pub struct SplashGuard {
    splash: Arc<SplashController>,
}

impl SplashGuard {
    pub fn new(splash: Arc<SplashController>) -> Self {
        Self { splash }
    }
}

impl Drop for SplashGuard {
    fn drop(&mut self) {
        self.splash.stop_logged();
    }
}
