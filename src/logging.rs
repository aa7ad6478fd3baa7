use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Logger that tags lines with a timestamp and gates debug output by topic
#[derive(Debug)]
struct FragRaceLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl log::Log for FragRaceLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Debug and trace lines only pass when their topic was asked for
        if let Some(filters) = &self.debug_filters {
            if metadata.level() >= log::Level::Debug {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        // Diagnostics go to stderr so reports on stdout stay clean
        let mut stderr = io::stderr();
        let _ = writeln!(
            stderr,
            "{timestamp} {level_color}{level:5}{reset} {target}: {message}",
            timestamp = timestamp,
            level_color = level_color,
            level = record.level(),
            reset = reset,
            target = record.target(),
            message = record.args()
        );
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: OnceLock<FragRaceLogger> = OnceLock::new();

/// Parse a level name, falling back to `Info` for anything unrecognized.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn parse_filters(debug_filter: Option<String>) -> Option<HashSet<String>> {
    debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    })
}

/// Install the logger. Topics: engine, respawn, sweep.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| FragRaceLogger {
        level,
        debug_filters: parse_filters(debug_filter),
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

#[macro_export]
macro_rules! debug_engine {
    ($tick:expr, $($arg:tt)*) => {
        log::debug!(target: "engine", "[T{:05}] {}", $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_respawn {
    ($tick:expr, $($arg:tt)*) => {
        log::debug!(target: "respawn", "[T{:05}] {}", $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_sweep {
    ($population:expr, $($arg:tt)*) => {
        log::debug!(target: "sweep", "[N{:04}] {}", $population, format_args!($($arg)*))
    };
}
