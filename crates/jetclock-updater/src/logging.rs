//! Tracing setup: stdout plus an append-only log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "jetclock=info";

/// Install the global subscriber.
///
/// `level` (from `--log-level`) wins over `RUST_LOG`. A log file that
/// cannot be opened only costs the file sink.
pub fn init(level: Option<&str>, log_file: Option<&Path>) {
    let file_layer = log_file.and_then(open_log_file).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    let result = tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer())
        .with(file_layer)
        .try_init();
    if let Err(e) = result {
        eprintln!("failed to install logger: {e}");
    }
}

fn filter(level: Option<&str>) -> EnvFilter {
    if let Some(level) = level {
        match EnvFilter::try_new(level) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("invalid log level {level:?}: {e}"),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot open log file {}: {e}; logging to stdout only", path.display());
            None
        }
    }
}
