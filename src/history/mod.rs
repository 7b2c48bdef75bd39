/// Rolling history log.
///
/// Submodules:
/// - `table`  — the in-memory table and its CSV encoding.
/// - `store`  — load/save handles (CSV file, in-memory).
/// - `writer` — timestamped, capped appends.

pub mod store;
pub mod table;
pub mod writer;

pub use store::{CsvHistoryStore, HistoryStore, MemoryHistoryStore};
pub use table::{HistoryTable, TIMESTAMP_COLUMN};
pub use writer::{RollingLogWriter, DEFAULT_MAX_ROWS};
