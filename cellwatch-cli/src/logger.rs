//! Minimal stderr backend for the `log` facade

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "error".red().bold(),
            Level::Warn => "warn".yellow().bold(),
            Level::Info => "info".green(),
            Level::Debug => "debug".blue(),
            Level::Trace => "trace".dimmed(),
        };
        eprintln!("[{}] {}", level, record.args());
    }

    fn flush(&self) {}
}

/// Install the logger; `verbosity` counts `-v` flags
pub fn init(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(filter);
    }
}
