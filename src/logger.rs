use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `log` backend writing to stderr and, optionally, a file
pub struct Logger {
    pub severity: Level,
    pub file: Option<Mutex<File>>,
    pub enable_colors: bool,
}

impl Logger {
    /// Create a new logger. A log file that cannot be opened is skipped.
    pub fn new(severity: Level, file_path: Option<PathBuf>, enable_colors: bool) -> Self {
        let file = file_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(Mutex::new)
        });

        Logger { severity, file, enable_colors }
    }

    fn timestamp() -> String {
        OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
    }

    fn color(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[36m",
            Level::Debug => "\x1b[35m",
            Level::Trace => "\x1b[37m",
        }
    }

    /// Install as the global logger, configured from the environment:
    /// `WIKILET_LOG` / `RUST_LOG` for the level, `WIKILET_LOG_FILE` for a log file,
    /// `NO_COLOR` to disable colours.
    pub fn init() -> Result<(), log::SetLoggerError> {
        let severity = std::env::var("WIKILET_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .and_then(|s| s.parse::<Level>().ok())
            .unwrap_or(Level::Info);
        let file_path = std::env::var("WIKILET_LOG_FILE").ok().map(PathBuf::from);
        let enable_colors = std::env::var("NO_COLOR").is_err();

        let logger = Logger::new(severity, file_path, enable_colors);
        log::set_max_level(LevelFilter::Trace);
        log::set_logger(Box::leak(Box::new(logger)))?;
        Ok(())
    }

    fn format_line(&self, record: &Record, colored: bool) -> String {
        let timestamp = Self::timestamp();
        let level = record.level().as_str();
        let target = record.target();
        let args = record.args();
        if colored {
            let color = Self::color(record.level());
            format!("{color}[{timestamp}] {level}\x1b[0m {target}: {args}")
        } else {
            format!("[{timestamp}] {level} {target}: {args}")
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.severity
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = self.format_line(record, self.enable_colors);
        let _ = writeln!(std::io::stderr(), "{line}");

        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", self.format_line(record, false));
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut guard) = file.lock() {
                let _ = guard.flush();
            }
        }
    }
}
