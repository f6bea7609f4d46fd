use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

/// Extract the human-readable message from a panic payload.
pub fn panic_message(info: &PanicHookInfo) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Build the JSON body of a crash report.
pub fn render_report(
    message: &str,
    location: Option<(&str, u32, u32)>,
    backtrace: &str,
) -> serde_json::Value {
    let location = location.map(|(file, line, column)| {
        serde_json::json!({
            "file": file,
            "line": line,
            "column": column,
        })
    });

    serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
        "pid": std::process::id(),
        "panic_message": message,
        "location": location,
        "backtrace": backtrace,
    })
}

/// Writes a crash report into `dir` when a panic occurs.
///
/// Returns the path to the written report, or `None` if writing failed.
/// Runs inside a panic hook, so every error is swallowed.
pub fn write_crash_report(info: &PanicHookInfo, dir: &Path) -> Option<PathBuf> {
    let message = panic_message(info);
    let location = info
        .location()
        .map(|loc| (loc.file(), loc.line(), loc.column()));
    let backtrace = Backtrace::force_capture().to_string();

    write_report(dir, &render_report(&message, location, &backtrace))
}

fn write_report(dir: &Path, report: &serde_json::Value) -> Option<PathBuf> {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let path = dir.join(format!("crash_{timestamp}.json"));

    std::fs::create_dir_all(dir).ok()?;
    std::fs::write(&path, serde_json::to_string_pretty(report).ok()?).ok()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
    }

    Some(path)
}
