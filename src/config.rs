/// Service configuration loaded from `rivers.toml`.
///
/// Sites are an array of tables so their order survives parsing; that order
/// is the column order of the history file. Every other key has a default,
/// so an empty file (or no file at all) runs against the built-in station
/// registry.
///
/// `.env` is honored via `dotenv`; set `RIVLOG_CONFIG` to point at a
/// different file.

use crate::history::DEFAULT_MAX_ROWS;
use crate::ingest::usgs::DEFAULT_BASE_URL;
use crate::logging::LogLevel;
use crate::model::GaugeSite;
use crate::stations;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "rivers.toml";
pub const CONFIG_ENV_VAR: &str = "RIVLOG_CONFIG";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: String, message: String },
    /// The file is not valid TOML or has the wrong shape.
    Parse(String),
    /// Parsed fine but violates a constraint (duplicate site name, etc).
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "Cannot read {}: {}", path, message),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SiteEntry {
    pub name: String,
    pub site_code: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub history_file: PathBuf,
    pub max_rows: usize,
    pub chart_dir: PathBuf,
    /// Render one SVG per series after each poll.
    pub charts: bool,
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Fetch sites on parallel worker threads instead of one after another.
    pub concurrent_fetch: bool,
    pub logging: LoggingConfig,
    pub sites: Vec<SiteEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from("river_levels.csv"),
            max_rows: DEFAULT_MAX_ROWS,
            chart_dir: PathBuf::from("charts"),
            charts: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            concurrent_fetch: true,
            logging: LoggingConfig::default(),
            sites: Vec::new(),
        }
    }
}

impl Config {
    /// Configured sites in file order, or the built-in registry when the
    /// file lists none.
    pub fn sites(&self) -> Vec<GaugeSite> {
        if self.sites.is_empty() {
            return stations::default_sites();
        }
        self.sites
            .iter()
            .map(|s| GaugeSite::new(s.name.trim(), s.site_code.trim()))
            .collect()
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse().map_err(ConfigError::Invalid)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rows == 0 {
            return Err(ConfigError::Invalid("max_rows must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.log_level()?;

        let mut seen = HashSet::new();
        for site in self.sites() {
            if site.name.is_empty() {
                return Err(ConfigError::Invalid("site with empty name".to_string()));
            }
            if site.site_code.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "site '{}' has an empty site_code",
                    site.name
                )));
            }
            // Names are column headers.
            if !seen.insert(site.name.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate site name '{}'",
                    site.name
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_config(&text)
}

/// Loads `.env`, then the file named by `RIVLOG_CONFIG` (which must exist)
/// or `rivers.toml` (defaults are used if it is absent).
pub fn load_from_env() -> Result<Config, ConfigError> {
    dotenv::dotenv().ok();

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => load_config(Path::new(&path)),
        Err(_) => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                load_config(path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
