//! Appends timestamped rows to the rolling history table.
//!
//! Each append is a full load → evict → append → save cycle against the
//! injected [`HistoryStore`]. The row is validated against the header before
//! anything is written, so a mismatched row never reaches storage.

use crate::history::store::HistoryStore;
use crate::history::table::{expected_header, HistoryTable};
use crate::logging::{self, DataSource};
use crate::model::{CurrentReading, GaugeSite, RiverError};
use chrono::{Local, NaiveDateTime};

/// `01-May-2024 (08:15:00.123456)`
pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y (%H:%M:%S%.6f)";

pub const DEFAULT_MAX_ROWS: usize = 100;

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell, TIMESTAMP_FORMAT).ok()
}

pub struct RollingLogWriter<'a, S: HistoryStore + ?Sized> {
    store: &'a S,
    max_rows: usize,
}

impl<'a, S: HistoryStore + ?Sized> RollingLogWriter<'a, S> {
    pub fn new(store: &'a S, max_rows: usize) -> Self {
        Self { store, max_rows }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// Appends `readings` stamped with the local wall clock.
    pub fn append(&self, readings: &[CurrentReading]) -> Result<HistoryTable, RiverError> {
        self.append_at(readings, Local::now().naive_local())
    }

    /// Appends `readings` after checking that the stored header is exactly
    /// `Time Stamp` followed by `sites` in order.
    pub fn append_for_sites(
        &self,
        sites: &[GaugeSite],
        readings: &[CurrentReading],
    ) -> Result<HistoryTable, RiverError> {
        if sites.len() != readings.len() {
            return Err(RiverError::SchemaMismatch(format!(
                "{} readings for {} configured sites",
                readings.len(),
                sites.len()
            )));
        }
        let header = expected_header(sites);
        self.append_checked(Some(header.as_slice()), readings, Local::now().naive_local())
    }

    /// Appends `readings` stamped with `now`. Exposed so tests can pin the
    /// clock.
    pub fn append_at(
        &self,
        readings: &[CurrentReading],
        now: NaiveDateTime,
    ) -> Result<HistoryTable, RiverError> {
        self.append_checked(None, readings, now)
    }

    fn append_checked(
        &self,
        header: Option<&[String]>,
        readings: &[CurrentReading],
        now: NaiveDateTime,
    ) -> Result<HistoryTable, RiverError> {
        let mut row = Vec::with_capacity(readings.len() + 1);
        row.push(format_timestamp(now));
        row.extend(readings.iter().map(CurrentReading::as_cell));

        let mut table = self.store.load()?;
        if table.drop_index_artifact() {
            logging::debug(DataSource::History, None, "dropped index column from stored table");
        }

        if let Some(expected) = header {
            if table.columns() != expected {
                return Err(RiverError::SchemaMismatch(format!(
                    "stored header {:?} does not match configured sites {:?}",
                    table.columns(),
                    expected
                )));
            }
        }

        if row.len() != table.columns().len() {
            return Err(RiverError::SchemaMismatch(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                table.columns().len()
            )));
        }

        let evicted = table.make_room(self.max_rows);
        if evicted > 0 {
            logging::debug(
                DataSource::History,
                None,
                &format!("evicted {} oldest row(s) to stay within {}", evicted, self.max_rows),
            );
        }

        table.push_row(row)?;
        self.store.save(&table)?;
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::store::MemoryHistoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sites() -> Vec<GaugeSite> {
        vec![
            GaugeSite::new("James River", "02037500"),
            GaugeSite::new("New River", "03171000"),
        ]
    }

    fn readings(a: &str, b: &str) -> Vec<CurrentReading> {
        vec![
            CurrentReading::from_json(json!(a)).unwrap(),
            CurrentReading::from_json(json!(b)).unwrap(),
        ]
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(8, 5, 9, 42)
            .unwrap()
    }

    fn table_with_rows(n: usize) -> HistoryTable {
        let mut table = HistoryTable::for_sites(&sites());
        for i in 0..n {
            table
                .push_row(vec![format!("t{}", i), i.to_string(), i.to_string()])
                .unwrap();
        }
        table
    }

    #[test]
    fn test_timestamp_format_matches_log_layout() {
        assert_eq!(format_timestamp(fixed_now()), "01-May-2024 (08:05:09.000042)");
    }

    #[test]
    fn test_timestamp_parses_back() {
        let cell = format_timestamp(fixed_now());
        assert_eq!(parse_timestamp(&cell), Some(fixed_now()));
        assert_eq!(parse_timestamp("2024-05-01 08:05"), None);
    }

    #[test]
    fn test_append_grows_table_below_cap() {
        let store = MemoryHistoryStore::with_table(table_with_rows(5));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);

        let table = writer.append_at(&readings("4520", "3100"), fixed_now()).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(
            table.last_row().unwrap(),
            &["01-May-2024 (08:05:09.000042)", "4520", "3100"]
        );
        assert_eq!(store.snapshot().unwrap(), table);
    }

    #[test]
    fn test_append_at_cap_keeps_row_count_and_drops_oldest() {
        let store = MemoryHistoryStore::with_table(table_with_rows(DEFAULT_MAX_ROWS));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);

        let table = writer.append_at(&readings("1", "2"), fixed_now()).unwrap();
        assert_eq!(table.len(), DEFAULT_MAX_ROWS);
        assert_eq!(table.rows()[0][0], "t1", "oldest row t0 should be evicted");
    }

    #[test]
    fn test_repeated_appends_never_exceed_cap() {
        let store = MemoryHistoryStore::with_table(table_with_rows(0));
        let writer = RollingLogWriter::new(&store, 3);
        for _ in 0..10 {
            let table = writer.append_at(&readings("1", "2"), fixed_now()).unwrap();
            assert!(table.len() <= 3);
        }
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[test]
    fn test_oversized_seed_is_trimmed_to_cap() {
        let store = MemoryHistoryStore::with_table(table_with_rows(150));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);
        let table = writer.append_at(&readings("1", "2"), fixed_now()).unwrap();
        assert_eq!(table.len(), DEFAULT_MAX_ROWS);
        assert_eq!(table.rows()[0][0], "t51");
    }

    #[test]
    fn test_seed_one_over_cap_loses_two_rows_in_one_append() {
        let store = MemoryHistoryStore::with_table(table_with_rows(101));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);
        let table = writer.append_at(&readings("1", "2"), fixed_now()).unwrap();
        assert_eq!(table.len(), DEFAULT_MAX_ROWS);
        assert_eq!(table.rows()[0][0], "t2");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_wrong_reading_count_is_rejected_without_saving() {
        let store = MemoryHistoryStore::with_table(table_with_rows(2));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);

        let one = vec![CurrentReading::from_json(json!("1")).unwrap()];
        let err = writer.append_at(&one, fixed_now()).unwrap_err();
        assert!(matches!(err, RiverError::SchemaMismatch(_)));
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_header_must_match_configured_sites() {
        let store = MemoryHistoryStore::with_table(table_with_rows(1));
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);

        let swapped = vec![sites()[1].clone(), sites()[0].clone()];
        let err = writer
            .append_for_sites(&swapped, &readings("1", "2"))
            .unwrap_err();
        assert!(matches!(err, RiverError::SchemaMismatch(_)));
        assert_eq!(store.save_count(), 0);

        let table = writer.append_for_sites(&sites(), &readings("1", "2")).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_index_artifact_is_not_written_back() {
        let csv = ",Time Stamp,James River,New River\n0,t0,1,2\n";
        let seeded = HistoryTable::from_csv(csv.as_bytes()).unwrap();
        let store = MemoryHistoryStore::with_table(seeded);
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);

        let table = writer.append_at(&readings("3", "4"), fixed_now()).unwrap();
        assert_eq!(table.columns(), &["Time Stamp", "James River", "New River"]);
        assert_eq!(table.rows()[0], vec!["t0", "1", "2"]);
    }

    #[test]
    fn test_missing_table_is_persistence_error() {
        let store = MemoryHistoryStore::new();
        let writer = RollingLogWriter::new(&store, DEFAULT_MAX_ROWS);
        assert!(matches!(
            writer.append_at(&readings("1", "2"), fixed_now()),
            Err(RiverError::Persistence(_))
        ));
    }
}
