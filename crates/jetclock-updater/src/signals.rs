//! Lifecycle signals: "UI ready" and "quit".
//!
//! SIGUSR1 means the managed application has drawn its UI. SIGINT and
//! SIGTERM mean quit. Both arrive on a channel so tests can inject them.

use std::sync::Arc;
use std::time::Duration;

use jetclock_common::ProcessState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::lifecycle::ExitReason;
use crate::splash::SplashController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    Ready,
    Quit,
}

/// Translate OS signals into [`LifecycleSignal`]s.
#[cfg(unix)]
pub fn listen_os_signals() -> std::io::Result<mpsc::Receiver<LifecycleSignal>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        loop {
            let signal = tokio::select! {
                _ = sigint.recv() => {
                    info!("received SIGINT");
                    LifecycleSignal::Quit
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM");
                    LifecycleSignal::Quit
                }
                _ = sigusr1.recv() => {
                    info!("received SIGUSR1");
                    LifecycleSignal::Ready
                }
            };
            if tx.send(signal).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Routes lifecycle signals until shutdown.
pub struct Dispatcher {
    pub state: Arc<ProcessState>,
    pub splash: Arc<SplashController>,
    pub exit: mpsc::Sender<ExitReason>,
    pub shutdown: CancellationToken,
    pub poll_interval: Duration,
}

impl Dispatcher {
    pub fn spawn(self, mut signals: mpsc::Receiver<LifecycleSignal>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let signal = tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    signal = signals.recv() => match signal {
                        Some(signal) => signal,
                        None => break,
                    },
                };

                match signal {
                    LifecycleSignal::Ready => {
                        info!("UI ready, waiting for bring-up to settle before clearing splash");
                        tokio::spawn(wait_until_ready(
                            self.state.clone(),
                            self.splash.clone(),
                            self.poll_interval,
                            self.shutdown.clone(),
                        ));
                    }
                    LifecycleSignal::Quit => {
                        info!("quit requested");
                        self.splash.stop_logged();
                        let _ = self.exit.send(ExitReason::Signal).await;
                    }
                }
            }
            debug!("signal dispatcher stopped");
        })
    }
}

/// Poll until the update has finished with no hotspot up, then clear the
/// splash. Returns `false` if shutdown came first.
pub async fn wait_until_ready(
    state: Arc<ProcessState>,
    splash: Arc<SplashController>,
    interval: Duration,
    shutdown: CancellationToken,
) -> bool {
    loop {
        if state.splash_may_clear() {
            info!("update finished and no hotspot, clearing splash");
            splash.stop_logged();
            return true;
        }
        tokio::select! {
            _ = shutdown.cancelled() => return false,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
