//! Full-screen status image viewer (`feh`).

use std::path::Path;
use std::process::{Command, Stdio};

use jetclock_common::DisplayError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::Viewer;

/// How hard to ask the viewer to go away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGTERM
    Graceful,
    /// SIGKILL
    Forceful,
}

impl StopSignal {
    fn as_signal(self) -> Signal {
        match self {
            StopSignal::Graceful => Signal::SIGTERM,
            StopSignal::Forceful => Signal::SIGKILL,
        }
    }
}

/// Image viewer launched as a detached child process.
pub struct FehViewer {
    program: String,
    args: Vec<String>,
}

impl FehViewer {
    pub fn with_command(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for FehViewer {
    fn default() -> Self {
        Self::with_command(
            "feh",
            vec![
                "--fullscreen".into(),
                "--hide-pointer".into(),
                "--auto-zoom".into(),
            ],
        )
    }
}

impl Viewer for FehViewer {
    fn launch(&self, image: &Path) -> Result<u32, DisplayError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(image)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if std::env::var_os("DISPLAY").is_none() {
            command.env("DISPLAY", ":0");
        }

        let mut child = command
            .spawn()
            .map_err(|e| DisplayError::Launch(format!("{}: {e}", self.program)))?;
        let pid = child.id();

        // Reap the viewer when it exits so it never lingers as a zombie.
        let reaper = std::thread::Builder::new()
            .name("splash-reaper".into())
            .spawn(move || {
                let _ = child.wait();
            });
        if let Err(e) = reaper {
            warn!(pid, "failed to start viewer reaper thread: {e}");
        }

        debug!(pid, image = %image.display(), "viewer launched");
        Ok(pid)
    }

    fn terminate(&self, pid: u32, signal: StopSignal) -> Result<(), DisplayError> {
        let raw = i32::try_from(pid).map_err(|_| DisplayError::Signal {
            pid,
            reason: "pid out of range".into(),
        })?;

        match kill(Pid::from_raw(raw), signal.as_signal()) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid, "viewer already gone");
                Ok(())
            }
            Err(e) => Err(DisplayError::Signal {
                pid,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn is_alive(pid: u32) -> bool {
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    fn wait_until_gone(pid: u32) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if !is_alive(pid) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn launch_and_terminate_process() {
        // `sleep 30` stands in for the viewer: the "image" is its argument.
        let viewer = FehViewer::with_command("sleep", Vec::new());
        let pid = viewer.launch(Path::new("30")).unwrap();
        assert!(is_alive(pid));

        viewer.terminate(pid, StopSignal::Graceful).unwrap();
        assert!(wait_until_gone(pid));
    }

    #[test]
    fn launch_missing_program_fails() {
        let viewer = FehViewer::with_command("definitely-not-a-viewer", Vec::new());
        let err = viewer.launch(Path::new("image.png")).unwrap_err();
        assert!(matches!(err, DisplayError::Launch(_)));
    }

    #[test]
    fn out_of_range_pid_is_rejected() {
        let viewer = FehViewer::default();
        let err = viewer.terminate(u32::MAX, StopSignal::Graceful).unwrap_err();
        assert!(matches!(err, DisplayError::Signal { .. }));
    }
}
