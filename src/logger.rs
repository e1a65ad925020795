//! Session log.
//!
//! One file per launch, truncated when opened, so it only ever holds the
//! most recent session:
//!
//!   Windows:  `%APPDATA%\PixelProbe\pixelprobe.log`
//!   Linux:    `~/.local/share/PixelProbe/pixelprobe.log`
//!   macOS:    `~/Library/Application Support/PixelProbe/pixelprobe.log`
//!
//! Use `log_info!` / `log_warn!` / `log_err!` anywhere. Until [`init`] has
//! run (headless mode without `--verbose`, unit tests) they do nothing.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static SINK: OnceLock<Mutex<File>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        })
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Append one record. I/O errors are swallowed.
pub fn write(level: Level, msg: &str) {
    let Some(sink) = SINK.get() else { return };
    if let Ok(mut file) = sink.lock() {
        let _ = writeln!(file, "{}", format_record(level, msg, unix_seconds()));
    }
}

/// `[HH:MM:SS] [LEVEL] msg`, time of day in UTC.
pub fn format_record(level: Level, msg: &str, unix_secs: u64) -> String {
    format!(
        "[{:02}:{:02}:{:02}] [{}] {}",
        (unix_secs % 86_400) / 3_600,
        (unix_secs % 3_600) / 60,
        unix_secs % 60,
        level,
        msg
    )
}

/// Open the default session log and install the panic hook.
/// Call once, before the GUI starts.
pub fn init() {
    let path = data_dir().join("PixelProbe").join("pixelprobe.log");
    if let Err(e) = init_at(&path) {
        // The session simply runs without a log.
        eprintln!("[logger] could not open {}: {}", path.display(), e);
    }
}

/// Open (truncating) a log at `path`. Only the first successful call
/// takes effect for the lifetime of the process.
pub fn init_at(path: &Path) -> io::Result<()> {
    if SINK.get().is_some() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    if SINK.set(Mutex::new(file)).is_err() {
        return Ok(());
    }

    if let Some(sink) = SINK.get() {
        if let Ok(mut file) = sink.lock() {
            let _ = writeln!(
                file,
                "=== PixelProbe {} session (unix {}) ===\nLog file: {}\n",
                env!("CARGO_PKG_VERSION"),
                unix_seconds(),
                path.display()
            );
        }
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        previous(info);
    }));
    Ok(())
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    let var = |name: &str| std::env::var_os(name).map(PathBuf::from);
    if cfg!(target_os = "windows") {
        if let Some(appdata) = var("APPDATA") {
            return appdata;
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = var("HOME") {
            return home.join("Library").join("Application Support");
        }
    }
    var("XDG_DATA_HOME")
        .or_else(|| var("HOME").map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_format() {
        // 1970-01-02 13:04:05 UTC
        let secs = 86_400 + 13 * 3_600 + 4 * 60 + 5;
        assert_eq!(
            format_record(Level::Warn, "pixel (3, 4) rejected", secs),
            "[13:04:05] [WARN] pixel (3, 4) rejected"
        );
        assert_eq!(format_record(Level::Info, "", 0), "[00:00:00] [INFO] ");
    }

    #[test]
    fn test_level_labels() {
        let labels: Vec<String> = [Level::Info, Level::Warn, Level::Error, Level::Panic]
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(labels, ["INFO", "WARN", "ERROR", "PANIC"]);
    }

    // The sink can only be opened once per process, so the whole lifecycle
    // lives in this one test.
    #[test]
    fn test_session_log_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("pixelprobe.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "previous session text\n").unwrap();

        crate::log_info!("written before init");

        init_at(&path).unwrap();
        crate::log_warn!("pixel ({}, {}) rejected", 3, 4);
        let caught = std::panic::catch_unwind(|| {
            panic!("decoder blew up");
        });
        assert!(caught.is_err());

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("previous session text"));
        assert!(!text.contains("written before init"));
        assert!(text.starts_with("=== PixelProbe "));
        assert!(text.contains(&format!("Log file: {}", path.display())));
        assert!(text.contains("[WARN] pixel (3, 4) rejected"));
        let panic_at = text.find("[PANIC]").unwrap();
        assert!(text[panic_at..].contains("decoder blew up"));
    }
}
