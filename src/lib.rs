//! River level logging service.
//!
//! Polls USGS NWIS for the current discharge at a handful of named sites,
//! keeps a capped rolling CSV log of the readings, and reports min/max/mean
//! per site with an SVG chart for each series.

pub mod analysis;
pub mod chart;
pub mod config;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod poll;
pub mod stations;
pub mod verify;
