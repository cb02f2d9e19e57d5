//! Panic reports appended to a crash log.
//!
//! The console may be gone by the time a user notices a crash, so every
//! panic is also written with a backtrace to a file in the home directory.

use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use snapocr_config::ocr::install_dir;

const CRASH_LOG: &str = "snapocr_crash.log";

/// `snapocr_crash.log` in the home directory, next to the executable without one
pub fn default_crash_log() -> PathBuf {
    home_dir().unwrap_or_else(install_dir).join(CRASH_LOG)
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Chain a hook that records the panic before the default handler runs
pub fn install_panic_hook(path: PathBuf) {
    let previous = std::panic::take_hook();
    let hook_path = path.clone();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("{info}");

        let report = format_report(&info.to_string(), &Backtrace::force_capture().to_string());
        if let Err(e) = append_report(&hook_path, &report) {
            eprintln!("Cannot write crash log {}: {e}", hook_path.display());
        }

        previous(info);
    }));
    tracing::debug!("Crash log at {}", path.display());
}

pub fn format_report(message: &str, backtrace: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    format!(
        "=== snapocr {} crashed at {secs} (unix) ===\n{message}\n\n{backtrace}\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Earlier reports are kept
pub fn append_report(path: &Path, report: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(report.as_bytes())?;
    file.flush()
}
