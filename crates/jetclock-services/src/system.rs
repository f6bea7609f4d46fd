//! Host OS control.

use std::path::Path;

use async_trait::async_trait;
use jetclock_common::SystemError;

use crate::SystemControl;

/// The real machine: reboots it and runs the managed binary.
#[derive(Debug, Default)]
pub struct HostSystem;

#[async_trait]
impl SystemControl for HostSystem {
    async fn reboot(&self) -> Result<(), SystemError> {
        jetclock_platform::system::reboot().await
    }

    async fn installed_version(&self, binary: &Path) -> Option<String> {
        jetclock_platform::system::query_version(binary).await
    }
}
