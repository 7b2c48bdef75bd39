/// USGS NWIS Instantaneous Values client.
///
/// Fetches the single most recent value for a gauge site from
/// `/nwis/iv/`. Only one scalar of the response is consumed:
/// `value.timeSeries[0].values[0].value[0].value`.
///
/// API Documentation: https://waterservices.usgs.gov/docs/instantaneous-values/

use crate::model::{CurrentReading, GaugeSite, RiverError, PARAM_DISCHARGE, PARAM_STAGE};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "http://waterservices.usgs.gov";

// ============================================================================
// URL construction
// ============================================================================

/// Builds the IV request for one site, asking for discharge and stage with
/// all site statuses.
pub fn build_iv_url(base_url: &str, site_code: &str) -> String {
    format!(
        "{}/nwis/iv/?format=json&sites={}&parameterCd={},{}&siteStatus=all",
        base_url.trim_end_matches('/'),
        site_code,
        PARAM_DISCHARGE,
        PARAM_STAGE
    )
}

// ============================================================================
// Response navigation
// ============================================================================

/// One hop into the decoded JSON body.
#[derive(Debug, Clone, Copy)]
enum Step {
    Field(&'static str),
    Index(usize),
}

const READING_PATH: &[Step] = &[
    Step::Field("value"),
    Step::Field("timeSeries"),
    Step::Index(0),
    Step::Field("values"),
    Step::Index(0),
    Step::Field("value"),
    Step::Index(0),
    Step::Field("value"),
];

/// Walks `path`, failing at the first step that is absent. The error names
/// the path walked so far, e.g. `value.timeSeries[0]`.
fn navigate<'a>(root: &'a Value, path: &[Step]) -> Result<&'a Value, RiverError> {
    let mut current = root;
    let mut walked = String::new();

    for step in path {
        match *step {
            Step::Field(name) => {
                if !walked.is_empty() {
                    walked.push('.');
                }
                walked.push_str(name);
                current = current.get(name).ok_or_else(|| {
                    RiverError::MalformedResponse(format!("missing field '{}'", walked))
                })?;
            }
            Step::Index(i) => {
                let array = current.as_array().ok_or_else(|| {
                    RiverError::MalformedResponse(format!("'{}' is not an array", walked))
                })?;
                walked.push_str(&format!("[{}]", i));
                current = array.get(i).ok_or_else(|| {
                    RiverError::MalformedResponse(format!(
                        "missing element '{}' (site has no current data)",
                        walked
                    ))
                })?;
            }
        }
    }

    Ok(current)
}

/// Parses an IV response body and returns the newest reading, untouched.
pub fn extract_current_value(body: &str) -> Result<CurrentReading, RiverError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| RiverError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    let leaf = navigate(&json, READING_PATH)?;
    CurrentReading::from_json(leaf.clone())
}

// ============================================================================
// API client functions
// ============================================================================

/// Fetch the current reading for one site.
///
/// One outbound request per call. No caching, no retry.
pub fn fetch_current_reading(
    client: &reqwest::blocking::Client,
    base_url: &str,
    site: &GaugeSite,
) -> Result<CurrentReading, RiverError> {
    let url = build_iv_url(base_url, &site.site_code);

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()?;

    if !response.status().is_success() {
        return Err(RiverError::Transport(format!(
            "HTTP error: {}",
            response.status().as_u16()
        )));
    }

    let body = response.text()?;
    extract_current_value(&body)
}

/// Fetch every site sequentially. The result is positionally aligned with
/// `sites`; the first failure aborts the batch.
///
/// Library entry point. `poll::fetch_sites` fetches each site itself so that
/// every failure is logged, not just the first.
pub fn fetch_all(
    client: &reqwest::blocking::Client,
    base_url: &str,
    sites: &[GaugeSite],
) -> Result<Vec<CurrentReading>, RiverError> {
    sites
        .iter()
        .map(|site| fetch_current_reading(client, base_url, site))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
