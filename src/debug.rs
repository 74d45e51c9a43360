//! Logging backend for chat-tabs
//!
//! Library code logs through the `log` facade; this module routes those
//! records to a debug log file.
//!
//! Controlled by DEBUG_LEVEL environment variable:
//! - 0 or unset: No debugging
//! - 1: Errors only
//! - 2: Info level (hydration, service lifecycle)
//! - 3: Debug level (tab transitions, writes)
//! - 4: Trace level (every completion event)
//!
//! All output goes to /tmp/chat_tabs_debug.log on Unix/macOS,
//! or %TEMP%\chat_tabs_debug.log on Windows. When RUST_LOG is set, records
//! are mirrored to stderr as well.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn parse(value: &str) -> Self {
        match value.trim().parse::<u8>() {
            Ok(1) => DebugLevel::Error,
            Ok(2) => DebugLevel::Info,
            Ok(3) => DebugLevel::Debug,
            Ok(4) => DebugLevel::Trace,
            _ => DebugLevel::Off,
        }
    }

    fn from_env() -> Self {
        std::env::var("DEBUG_LEVEL")
            .map(|val| Self::parse(&val))
            .unwrap_or(DebugLevel::Off)
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Error,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Location of the debug log file
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    let path = PathBuf::from("/tmp/chat_tabs_debug.log");
    #[cfg(not(unix))]
    let path = std::env::temp_dir().join("chat_tabs_debug.log");
    path
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn format_record(record: &log::Record) -> String {
    let level_str = match record.level() {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    };
    format!(
        "[{}] [{}] [{}] {}\n",
        get_timestamp(),
        level_str,
        record.target(),
        record.args()
    )
}

/// `log::Log` implementation writing to the debug file and optionally stderr
struct LogBridge {
    level: log::LevelFilter,
    file: Option<Mutex<File>>,
    mirror_stderr: bool,
}

impl LogBridge {
    fn new(level: log::LevelFilter, mirror_stderr: bool) -> Self {
        let file = if level == log::LevelFilter::Off {
            None
        } else {
            // Silently fall back to no file; stderr mirroring still works
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(log_path())
                .ok()
                .map(Mutex::new)
        };

        let bridge = Self {
            level,
            file,
            mirror_stderr,
        };
        bridge.write_raw(&format!(
            "\n{}\nchat-tabs debug session started at {} (level={})\n{}\n",
            "=".repeat(80),
            get_timestamp(),
            level,
            "=".repeat(80)
        ));
        bridge
    }

    fn write_raw(&self, msg: &str) {
        if let Some(file) = &self.file {
            let mut file = file.lock();
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        self.write_raw(&line);
        if self.mirror_stderr {
            let _ = std::io::stderr().write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            let _ = file.lock().flush();
        }
    }
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Pick the effective level: CLI override, then RUST_LOG, then DEBUG_LEVEL
fn resolve_level(
    override_level: Option<log::LevelFilter>,
    rust_log: Option<&str>,
    debug_level: DebugLevel,
) -> log::LevelFilter {
    if let Some(level) = override_level {
        return level;
    }
    if let Some(filter) = rust_log
        && let Ok(level) = filter.trim().parse::<log::LevelFilter>()
    {
        return level;
    }
    debug_level.to_level_filter()
}

/// Install the log bridge as the global logger.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_log_bridge(override_level: Option<log::LevelFilter>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = resolve_level(override_level, rust_log.as_deref(), DebugLevel::from_env());
    let bridge = BRIDGE.get_or_init(|| LogBridge::new(level, rust_log.is_some()));

    if log::set_logger(bridge).is_ok() {
        log::set_max_level(bridge.level);
    }
}
