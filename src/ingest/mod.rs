/// Data source clients.
///
/// - `usgs` — USGS NWIS instantaneous values (current gauge readings).

pub mod usgs;
