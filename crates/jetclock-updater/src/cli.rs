use std::path::PathBuf;

use clap::Parser;

/// JetClock updater: brings the device online, updates it, or opens a setup hotspot.
#[derive(Parser, Debug)]
#[command(name = "jetclock-updater", version, about)]
pub struct Args {
    /// Reboot the OS instead of starting up.
    #[arg(long)]
    pub reboot: bool,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, jetclock_updater=trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
