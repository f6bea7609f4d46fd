//! Decide whether the device is online, trying a known network if not.

use std::sync::Arc;
use std::time::Duration;

use jetclock_common::ConnectivityError;
use jetclock_services::ConnectivityService;
use tracing::{info, warn};

pub struct ConnectivityResolver {
    service: Arc<dyn ConnectivityService>,
    deadline: Duration,
}

impl ConnectivityResolver {
    pub fn new(service: Arc<dyn ConnectivityService>, deadline: Duration) -> Self {
        Self { service, deadline }
    }

    /// `true` when the device ends up with working internet.
    ///
    /// Forcing the hotspot skips every probe. A reconnect attempt is bounded
    /// by the deadline no matter how the service behaves.
    pub async fn resolve(&self, force_hotspot: bool) -> bool {
        if force_hotspot {
            info!("ForceHotspot is set, skipping connectivity check");
            return false;
        }

        if self.service.has_internet().await {
            info!("internet connection detected");
            return true;
        }

        info!(deadline = ?self.deadline, "offline, trying known Wi-Fi networks");
        match tokio::time::timeout(self.deadline, self.service.connect_known(self.deadline)).await
        {
            Ok(Ok(())) => {
                info!("reconnected to a known network");
                true
            }
            Ok(Err(e)) => {
                warn!("could not reconnect: {e}");
                false
            }
            Err(_) => {
                warn!("{}", ConnectivityError::Timeout(self.deadline));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeConnectivity, Reconnect};
    use std::sync::atomic::Ordering;
    use tokio::time::Instant;

    const DEADLINE: Duration = Duration::from_secs(20);

    #[tokio::test]
    async fn forced_hotspot_skips_probing() {
        let service = FakeConnectivity::online();
        let resolver = ConnectivityResolver::new(service.clone(), DEADLINE);

        assert!(!resolver.resolve(true).await);
        assert_eq!(service.probes.load(Ordering::SeqCst), 0);
        assert_eq!(service.reconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn online_device_never_reconnects() {
        let service = FakeConnectivity::online();
        let resolver = ConnectivityResolver::new(service.clone(), DEADLINE);

        assert!(resolver.resolve(false).await);
        assert_eq!(service.probes.load(Ordering::SeqCst), 1);
        assert_eq!(service.reconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_reconnect_counts_as_online() {
        let service = FakeConnectivity::offline(Reconnect::Succeed);
        let resolver = ConnectivityResolver::new(service.clone(), DEADLINE);

        assert!(resolver.resolve(false).await);
        assert_eq!(service.reconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_reconnect_is_offline() {
        let service = FakeConnectivity::offline(Reconnect::Fail);
        let resolver = ConnectivityResolver::new(service, DEADLINE);

        assert!(!resolver.resolve(false).await);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_reconnect_gives_up_at_the_deadline() {
        let service = FakeConnectivity::offline(Reconnect::Hang);
        let resolver = ConnectivityResolver::new(service, DEADLINE);

        let started = Instant::now();
        assert!(!resolver.resolve(false).await);
        let elapsed = started.elapsed();

        assert!(elapsed >= DEADLINE);
        assert!(elapsed <= DEADLINE + Duration::from_secs(1));
    }
}
