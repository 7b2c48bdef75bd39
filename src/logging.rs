/// Structured logging for the river level service
///
/// Provides context-rich logging with site identifiers, timestamps, and
/// severity levels. Supports console output and an optional append-only
/// log file for scheduled (cron) runs.

use crate::model::RiverError;
use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Usgs,
    History,
    Chart,
    Config,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::History => write!(f, "HISTORY"),
            DataSource::Chart => write!(f, "CHART"),
            DataSource::Config => write!(f, "CONFIG"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - site has no current value (seasonal, ice, offline)
    Expected,
    /// Unexpected failure - service degradation, API change, or local I/O
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    fn format_entry(level: LogLevel, source: &DataSource, site_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, site_part, message)
    }

    fn log(&self, level: LogLevel, source: &DataSource, site_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, site_id, message);
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, site_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, site_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", source, site_part, message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn with_logger(f: impl FnOnce(&Logger)) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            f(logger);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger. Calling it again replaces the settings.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    let logger = Logger {
        min_level,
        log_file: log_file.map(String::from),
        console_timestamps,
    };
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }
}

/// Log a general informational message
pub fn info(source: DataSource, site_id: Option<&str>, message: &str) {
    with_logger(|logger| logger.log(LogLevel::Info, &source, site_id, message));
}

/// Log a warning message
pub fn warn(source: DataSource, site_id: Option<&str>, message: &str) {
    with_logger(|logger| logger.log(LogLevel::Warning, &source, site_id, message));
}

/// Log an error message
pub fn error(source: DataSource, site_id: Option<&str>, message: &str) {
    with_logger(|logger| logger.log(LogLevel::Error, &source, site_id, message));
}

/// Log a debug message
pub fn debug(source: DataSource, site_id: Option<&str>, message: &str) {
    with_logger(|logger| logger.log(LogLevel::Debug, &source, site_id, message));
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a fetch failure for one site.
pub fn classify_fetch_failure(err: &RiverError) -> FailureType {
    match err {
        // Empty timeSeries or values arrays: the site simply has no current
        // value right now.
        RiverError::MalformedResponse(msg) if msg.contains("no current data") => {
            FailureType::Expected
        }
        // HTTP errors and unparseable bodies point at the service or an
        // API change.
        RiverError::Transport(msg) if msg.contains("HTTP error") => FailureType::Unexpected,
        RiverError::MalformedResponse(_) => FailureType::Unexpected,
        // Connection resets, DNS, timeouts.
        RiverError::Transport(_) => FailureType::Unknown,
        _ => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification
pub fn log_fetch_failure(site_name: &str, err: &RiverError) {
    let failure_type = classify_fetch_failure(err);
    let message = format!("fetch failed [{}]: {}", failure_type, err);

    match failure_type {
        FailureType::Expected => warn(DataSource::Usgs, Some(site_name), &message),
        FailureType::Unexpected => error(DataSource::Usgs, Some(site_name), &message),
        FailureType::Unknown => warn(DataSource::Usgs, Some(site_name), &message),
    }
}

// ---------------------------------------------------------------------------
// Poll Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one poll across all sites
pub fn log_poll_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Poll complete: {}/{} sites fetched, {} failed",
        successful,
        total,
        failed
    );

    if failed == 0 {
        info(DataSource::System, None, &message);
    } else if successful == 0 {
        error(DataSource::System, None, &message);
    } else {
        warn(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parses_config_spellings() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        let no_data = RiverError::MalformedResponse(
            "missing element 'value.timeSeries[0]' (site has no current data)".to_string(),
        );
        assert_eq!(classify_fetch_failure(&no_data), FailureType::Expected);

        let http = RiverError::Transport("HTTP error: 503".to_string());
        assert_eq!(classify_fetch_failure(&http), FailureType::Unexpected);

        let not_json = RiverError::MalformedResponse("body is not JSON: eof".to_string());
        assert_eq!(classify_fetch_failure(&not_json), FailureType::Unexpected);

        let reset = RiverError::Transport("connection reset by peer".to_string());
        assert_eq!(classify_fetch_failure(&reset), FailureType::Unknown);
    }

    #[test]
    fn test_entry_includes_level_source_and_site() {
        let entry = Logger::format_entry(LogLevel::Warning, &DataSource::Usgs, Some("James River"), "slow");
        assert!(entry.ends_with("WARN USGS [James River]: slow"), "got: {}", entry);
    }
}
