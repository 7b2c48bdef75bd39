//! Site Verification
//!
//! Checks each configured site against the live IV endpoint and reports
//! whether it currently returns a value the history log can use. Run this
//! before adding a site to `rivers.toml`.

use crate::config::Config;
use crate::ingest::usgs::fetch_current_reading;
use crate::logging::classify_fetch_failure;
use crate::model::{GaugeSite, RiverError};
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub base_url: String,
    pub results: Vec<SiteVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteVerification {
    pub name: String,
    pub site_code: String,
    pub status: VerificationStatus,
    pub current_value: Option<String>,
    pub failure_type: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    /// A numeric current value was returned.
    Success,
    /// A value was returned but it is not numeric (e.g. "Ice"); appending
    /// it would break statistics for the column.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

/// Classifies an already-fetched result. Split out from `verify_site` so the
/// decision logic is testable without the network.
pub fn classify_result(
    site: &GaugeSite,
    result: Result<String, RiverError>,
) -> SiteVerification {
    let mut verification = SiteVerification {
        name: site.name.clone(),
        site_code: site.site_code.clone(),
        status: VerificationStatus::Failed,
        current_value: None,
        failure_type: None,
        error_message: None,
    };

    match result {
        Ok(value) => {
            verification.status = if value.trim().parse::<f64>().is_ok() {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
            verification.current_value = Some(value);
        }
        Err(e) => {
            verification.failure_type = Some(classify_fetch_failure(&e).to_string());
            verification.error_message = Some(e.to_string());
        }
    }

    verification
}

pub fn verify_site(
    client: &reqwest::blocking::Client,
    base_url: &str,
    site: &GaugeSite,
) -> SiteVerification {
    let result = fetch_current_reading(client, base_url, site).map(|r| r.as_cell());
    classify_result(site, result)
}

pub fn summarize_results(results: &[SiteVerification]) -> VerificationSummary {
    let failed = results
        .iter()
        .filter(|r| r.status == VerificationStatus::Failed)
        .count();
    VerificationSummary {
        total: results.len(),
        working: results.len() - failed,
        failed,
    }
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_verification(
    config: &Config,
    client: &reqwest::blocking::Client,
) -> VerificationReport {
    let results: Vec<_> = config
        .sites()
        .iter()
        .map(|site| verify_site(client, &config.base_url, site))
        .collect();

    VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        base_url: config.base_url.clone(),
        summary: summarize_results(&results),
        results,
    }
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 SITE VERIFICATION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    for result in &report.results {
        match result.status {
            VerificationStatus::Success => println!(
                "  ✓ {} ({}): {}",
                result.name,
                result.site_code,
                result.current_value.as_deref().unwrap_or("")
            ),
            VerificationStatus::PartialSuccess => println!(
                "  ⚠ {} ({}): non-numeric value '{}'",
                result.name,
                result.site_code,
                result.current_value.as_deref().unwrap_or("")
            ),
            VerificationStatus::Failed => println!(
                "  ✗ {} ({}): {}",
                result.name,
                result.site_code,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }
    println!();
    println!(
        "Sites: {}/{} working  ({} failed)",
        report.summary.working, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}
