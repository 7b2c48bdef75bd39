//! One polling run: fetch every site, append the row, summarize, plot.
//!
//! Fetches may run on scoped worker threads, one per site. Results are
//! collected in site order regardless of completion order, because column
//! position is what ties a value to its site. Any failed fetch aborts the
//! run before the history file is touched.

use crate::analysis::series_stats;
use crate::chart::build_chart;
use crate::config::Config;
use crate::history::{HistoryStore, HistoryTable, RollingLogWriter};
use crate::ingest::usgs::fetch_current_reading;
use crate::logging::{self, DataSource};
use crate::model::{CurrentReading, GaugeSite, RiverError, StatsSummary};
use std::path::{Path, PathBuf};

pub fn build_client(config: &Config) -> Result<reqwest::blocking::Client, RiverError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

/// Fetches all sites in parallel. The returned vector is aligned with
/// `sites`.
pub fn fetch_concurrent(
    client: &reqwest::blocking::Client,
    base_url: &str,
    sites: &[GaugeSite],
) -> Vec<Result<CurrentReading, RiverError>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = sites
            .iter()
            .map(|site| scope.spawn(move || fetch_current_reading(client, base_url, site)))
            .collect();

        handles
            .into_iter()
            .zip(sites)
            .map(|(handle, site)| {
                handle.join().unwrap_or_else(|_| {
                    Err(RiverError::Transport(format!(
                        "fetch worker for '{}' panicked",
                        site.name
                    )))
                })
            })
            .collect()
    })
}

/// Fetches every site, logging each failure, and returns the readings in
/// site order or the first error.
pub fn fetch_sites(
    client: &reqwest::blocking::Client,
    base_url: &str,
    sites: &[GaugeSite],
    concurrent: bool,
) -> Result<Vec<CurrentReading>, RiverError> {
    let results: Vec<_> = if concurrent {
        fetch_concurrent(client, base_url, sites)
    } else {
        sites
            .iter()
            .map(|site| fetch_current_reading(client, base_url, site))
            .collect()
    };

    let mut readings = Vec::with_capacity(results.len());
    let mut first_error = None;

    for (site, result) in sites.iter().zip(results) {
        match result {
            Ok(reading) => {
                logging::debug(
                    DataSource::Usgs,
                    Some(&site.name),
                    &format!("{} = {}", site.site_code, reading),
                );
                readings.push(reading);
            }
            Err(e) => {
                logging::log_fetch_failure(&site.name, &e);
                first_error.get_or_insert(e);
            }
        }
    }

    logging::log_poll_summary(sites.len(), readings.len(), sites.len() - readings.len());

    match first_error {
        Some(e) => Err(e),
        None => Ok(readings),
    }
}

/// Fetches current readings and appends them as one row. Returns the
/// updated table.
pub fn poll_once<S: HistoryStore + ?Sized>(
    config: &Config,
    client: &reqwest::blocking::Client,
    store: &S,
) -> Result<HistoryTable, RiverError> {
    let sites = config.sites();
    let readings = fetch_sites(client, &config.base_url, &sites, config.concurrent_fetch)?;

    let writer = RollingLogWriter::new(store, config.max_rows);
    let table = writer.append_for_sites(&sites, &readings)?;

    logging::info(
        DataSource::History,
        None,
        &format!("appended row; table now holds {} row(s)", table.len()),
    );
    Ok(table)
}

/// Stats for every series in the stored table, each read independently.
pub fn summarize_all<S: HistoryStore + ?Sized>(
    store: &S,
) -> Result<Vec<(String, Result<StatsSummary, RiverError>)>, RiverError> {
    let mut table = store.load()?;
    table.drop_index_artifact();

    Ok(table
        .series_names()
        .iter()
        .map(|name| (name.clone(), series_stats(store, name)))
        .collect())
}

/// Writes one SVG per series of `table` into `dir`.
pub fn render_charts(table: &HistoryTable, dir: &Path) -> Result<Vec<PathBuf>, RiverError> {
    let mut written = Vec::new();
    for name in table.series_names() {
        let values = table.series(name)?;
        let chart = build_chart(name, &values)?;
        let path = chart.save_svg_in(dir)?;
        logging::debug(DataSource::Chart, Some(name), &format!("wrote {}", path.display()));
        written.push(path);
    }
    Ok(written)
}
