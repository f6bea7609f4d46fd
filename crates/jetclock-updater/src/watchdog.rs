//! One-shot safety timers.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Run `action` once after `delay` unless `shutdown` is cancelled first.
///
/// The handle resolves to whether the timer fired.
pub fn arm<F, Fut>(
    name: &'static str,
    delay: Duration,
    shutdown: CancellationToken,
    action: F,
) -> JoinHandle<bool>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(watchdog = name, "disarmed");
                false
            }
            _ = tokio::time::sleep(delay) => {
                info!(watchdog = name, ?delay, "fired");
                action().await;
                true
            }
        }
    })
}
