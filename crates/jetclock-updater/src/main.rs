mod cli;
mod connectivity;
mod hotspot;
mod lifecycle;
mod logging;
mod signals;
mod splash;
mod update_task;
mod watchdog;

#[cfg(test)]
mod fakes;

use std::path::PathBuf;
use std::sync::Arc;

use jetclock_config::PORT_ENV_VAR;
use jetclock_platform::{ImageSet, Paths, PidFile};
use jetclock_services::{FehViewer, HostSystem, HotspotConfig, SystemControl};
use tokio::sync::mpsc;

use crate::lifecycle::{Lifecycle, Services, Settings, Timings, RELEASE_REPOSITORY};
use crate::splash::{SplashController, SplashGuard};

fn install_panic_hook(splash: Arc<SplashController>, crash_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let path = jetclock_platform::crash_report::write_crash_report(info, &crash_dir);

        eprintln!("\n--- jetclock-updater crashed ---");
        if let Some(p) = &path {
            eprintln!("Crash report written to: {}", p.display());
        }
        eprintln!("--------------------------------\n");

        splash.stop_from_panic_hook();
        default_hook(info);
    }));
}

#[tokio::main]
async fn main() {
    let args = cli::parse();
    let paths = Paths::resolve();

    logging::init(args.log_level.as_deref(), Some(&paths.log_file()));
    tracing::info!(
        "jetclock-updater v{} started with PID {}",
        env!("CARGO_PKG_VERSION"),
        std::process::id()
    );
    tracing::info!(home = %paths.home().display(), "device home resolved");

    if args.reboot {
        tracing::info!("reboot requested on the command line");
        if let Err(e) = HostSystem.reboot().await {
            tracing::error!("{e}");
            std::process::exit(1);
        }
        return;
    }

    let images = ImageSet::new(paths.images_dir());
    if let Err(e) = images.ensure_default() {
        tracing::warn!(
            "could not write default status image into {}: {e}",
            images.dir().display()
        );
    }
    let splash = Arc::new(SplashController::new(
        Arc::new(FehViewer::default()),
        PidFile::new(paths.splash_pid_file()),
        images,
    ));
    install_panic_hook(Arc::clone(&splash), paths.crash_report_dir());
    let splash_guard = SplashGuard::new(Arc::clone(&splash));

    let signals = match signals::listen_os_signals() {
        Ok(rx) => rx,
        Err(e) => {
            tracing::warn!("signal handling unavailable: {e}");
            mpsc::channel(1).1
        }
    };

    let settings = Settings {
        config_path: args.config.unwrap_or_else(|| paths.config_file()),
        port_override: std::env::var(PORT_ENV_VAR).ok(),
        managed_binary: paths.managed_binary(),
        repository: RELEASE_REPOSITORY.to_string(),
        hotspot: HotspotConfig::default(),
        timings: Timings::default(),
    };

    let lifecycle = Lifecycle::new(settings, Services::production(), splash);
    let mut phases = lifecycle.phases();
    tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            tracing::info!(?phase, "bring-up phase");
        }
    });

    let termination = lifecycle.run(signals).await;

    drop(splash_guard);
    std::process::exit(termination.code);
}
