//! PID-file bookkeeping for externally launched helper processes.
//!
//! All operations tolerate the file being absent, so several actors may
//! race to clear the same file without surfacing errors.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// What was found in a PID-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidRecord {
    Pid(u32),
    /// The file exists but does not hold a usable process id.
    Corrupt,
}

/// A PID-file at a fixed path.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded pid. `Ok(None)` when there is no file.
    pub fn read(&self) -> io::Result<Option<PidRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let record = match content.trim().parse::<u32>() {
            Ok(pid) if pid > 0 => PidRecord::Pid(pid),
            _ => PidRecord::Corrupt,
        };
        Ok(Some(record))
    }

    /// Record `pid`, replacing any previous content atomically.
    pub fn write(&self, pid: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension(format!("pid.{}", std::process::id()));
        fs::write(&tmp, format!("{pid}\n"))?;
        fs::rename(&tmp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }

    /// Delete the file. Returns `false` if it was already gone.
    pub fn remove(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
