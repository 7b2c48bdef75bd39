/// Core data types for the river level logging service.
///
/// This module defines the shared domain model imported by all other modules:
/// site identity, the raw current reading, the summary statistics record and
/// the crate-wide error type. The history table itself lives in
/// `history::table` because it owns its CSV representation.

use std::fmt;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// USGS parameter code for discharge (streamflow), in cubic feet per second.
pub const PARAM_DISCHARGE: &str = "00060";

/// USGS parameter code for gage height (stage), in feet.
pub const PARAM_STAGE: &str = "00065";

/// Unit label used on every chart axis and in log output.
pub const UNIT_LABEL: &str = "Cubic Feet per Second (cfs)";

// ---------------------------------------------------------------------------
// Site and reading types
// ---------------------------------------------------------------------------

/// One monitored gauge location.
///
/// `name` doubles as the column header in the history table, so it must be
/// unique within a configuration. `site_code` is opaque to this service and
/// is passed straight through to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeSite {
    pub name: String,
    pub site_code: String,
}

impl GaugeSite {
    pub fn new(name: impl Into<String>, site_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            site_code: site_code.into(),
        }
    }
}

/// The most recent instantaneous value for a site, exactly as the provider
/// returned it.
///
/// USGS encodes values as numeric-looking strings (`"4520"`), but the scalar
/// is kept untouched here; coercion to `f64` happens only when the history
/// column is read back for statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReading(serde_json::Value);

impl CurrentReading {
    /// Wraps a JSON scalar. Objects, arrays and null are rejected because
    /// they cannot be stored as a single table cell.
    pub fn from_json(value: serde_json::Value) -> Result<Self, RiverError> {
        match value {
            serde_json::Value::String(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::Bool(_) => Ok(CurrentReading(value)),
            other => Err(RiverError::MalformedResponse(format!(
                "expected a scalar reading, found {}",
                other
            ))),
        }
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    /// Text form written into the history table.
    pub fn as_cell(&self) -> String {
        match &self.0 {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CurrentReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cell())
    }
}

/// Minimum, maximum and mean of one history column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while fetching, persisting, summarizing or plotting readings.
#[derive(Debug, PartialEq)]
pub enum RiverError {
    /// The request could not be completed or returned a non-2xx status.
    Transport(String),
    /// The body was not JSON, or the expected reading path was missing.
    MalformedResponse(String),
    /// The history file could not be read or written.
    Persistence(String),
    /// Row length does not match the header, or a column name is unknown.
    SchemaMismatch(String),
    /// A stored cell could not be parsed as a number.
    NumericCoercion {
        column: String,
        row: usize,
        value: String,
    },
    /// Statistics or a chart were requested over zero values.
    EmptySeries(String),
    /// A chart could not be drawn or written.
    Render(String),
}

impl fmt::Display for RiverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiverError::Transport(msg) => write!(f, "Transport error: {}", msg),
            RiverError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            RiverError::Persistence(msg) => write!(f, "Persistence error: {}", msg),
            RiverError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {}", msg),
            RiverError::NumericCoercion { column, row, value } => write!(
                f,
                "Cannot parse '{}' in column '{}' (row {}) as a number",
                value, column, row
            ),
            RiverError::EmptySeries(series) => write!(f, "No values in series: {}", series),
            RiverError::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RiverError {}

impl From<reqwest::Error> for RiverError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RiverError::Transport(format!("HTTP error: {}", status.as_u16())),
            None => RiverError::Transport(err.to_string()),
        }
    }
}

impl From<std::io::Error> for RiverError {
    fn from(err: std::io::Error) -> Self {
        RiverError::Persistence(err.to_string())
    }
}

impl From<csv::Error> for RiverError {
    fn from(err: csv::Error) -> Self {
        RiverError::Persistence(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
