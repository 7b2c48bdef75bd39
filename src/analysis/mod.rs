/// Descriptive statistics over the rolling history.
///
/// Submodules:
/// - `stats` — min/max/mean of one series, read straight from the store.

pub mod stats;

pub use stats::{series_stats, summarize};
