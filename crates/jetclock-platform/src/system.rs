//! Host OS operations: reboot and querying the managed binary's version.

use std::path::Path;
use std::process::Stdio;

use jetclock_common::SystemError;
use tokio::process::Command;
use tracing::{info, warn};

const REBOOT_COMMAND: [&str; 2] = ["sudo", "reboot"];

/// Ask the OS to reboot. Returns once the reboot command has been accepted.
pub async fn reboot() -> Result<(), SystemError> {
    info!("requesting OS reboot");
    let [program, arg] = REBOOT_COMMAND;
    let status = Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| SystemError::Reboot(format!("failed to run {program} {arg}: {e}")))?;

    if status.success() {
        Ok(())
    } else {
        Err(SystemError::Reboot(format!("{program} {arg} exited with {status}")))
    }
}

/// Run `<binary> --version` and return its trimmed output.
///
/// `None` when the binary is missing, fails, or prints nothing.
pub async fn query_version(binary: &Path) -> Option<String> {
    let output = match Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!("failed to run {} --version: {e}", binary.display());
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "{} --version exited with {}",
            binary.display(),
            output.status
        );
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("fake-app");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn version_is_trimmed_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "echo '  v1.4.2  '");
        assert_eq!(query_version(&binary).await.as_deref(), Some("v1.4.2"));
    }

    #[tokio::test]
    async fn missing_binary_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(query_version(&dir.path().join("absent")).await, None);
    }

    #[tokio::test]
    async fn failing_binary_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "echo v9.9.9; exit 3");
        assert_eq!(query_version(&binary).await, None);
    }

    #[tokio::test]
    async fn empty_output_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let binary = script(dir.path(), "true");
        assert_eq!(query_version(&binary).await, None);
    }
}
