//! Min/max/mean over one history series.

use crate::history::store::HistoryStore;
use crate::model::{RiverError, StatsSummary};

/// Summarizes `values`. `series` is used only to label the empty-series
/// error.
pub fn summarize(series: &str, values: &[f64]) -> Result<StatsSummary, RiverError> {
    if values.is_empty() {
        return Err(RiverError::EmptySeries(series.to_string()));
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Ok(StatsSummary { min, max, mean })
}

/// Loads the table from `store` and summarizes the named column.
///
/// Read-only: the store is never saved to.
pub fn series_stats<S: HistoryStore + ?Sized>(
    store: &S,
    series: &str,
) -> Result<StatsSummary, RiverError> {
    let mut table = store.load()?;
    table.drop_index_artifact();
    let values = table.series(series)?;
    summarize(series, &values)
}
