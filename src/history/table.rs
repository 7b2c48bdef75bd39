//! In-memory form of the rolling history log and its CSV encoding.
//!
//! Every cell is kept as text, the way it sits on disk. Numeric coercion
//! happens only in [`HistoryTable::series`], when a column is summarized.

use crate::model::{GaugeSite, RiverError};
use std::io::{Read, Write};

/// Header of the first column.
pub const TIMESTAMP_COLUMN: &str = "Time Stamp";

/// Rolling log: a fixed header and rows ordered oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl HistoryTable {
    /// Empty table with an explicit header.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Empty table whose header is `Time Stamp` followed by the site names,
    /// in the order given.
    pub fn for_sites(sites: &[GaugeSite]) -> Self {
        Self::new(expected_header(sites))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_row(&self) -> Option<&[String]> {
        self.rows.last().map(|r| r.as_slice())
    }

    /// Series (site) column names, i.e. the header without `Time Stamp`.
    pub fn series_names(&self) -> &[String] {
        match self.columns.first() {
            Some(first) if first == TIMESTAMP_COLUMN => &self.columns[1..],
            _ => &self.columns,
        }
    }

    /// Appends a row after checking it has one cell per column.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), RiverError> {
        if row.len() != self.columns.len() {
            return Err(RiverError::SchemaMismatch(format!(
                "row has {} cells but table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Removes oldest rows until one more row fits under `max_rows`.
    /// Returns how many rows were evicted.
    pub fn make_room(&mut self, max_rows: usize) -> usize {
        let keep = max_rows.saturating_sub(1);
        if self.rows.len() <= keep {
            return 0;
        }
        let evicted = self.rows.len() - keep;
        self.rows.drain(..evicted);
        evicted
    }

    pub fn column_index(&self, name: &str) -> Result<usize, RiverError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RiverError::SchemaMismatch(format!("no column named '{}'", name)))
    }

    /// Raw text cells of one column, oldest first.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, RiverError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// One column coerced to `f64`. Fails on the first cell that does not
    /// parse.
    pub fn series(&self, name: &str) -> Result<Vec<f64>, RiverError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = cells[idx].trim();
                cell.parse::<f64>().map_err(|_| RiverError::NumericCoercion {
                    column: name.to_string(),
                    row,
                    value: cells[idx].clone(),
                })
            })
            .collect()
    }

    /// Drops a leading row-index column left behind by dataframe tooling
    /// (blank header or `Unnamed: 0`). Returns whether one was removed.
    pub fn drop_index_artifact(&mut self) -> bool {
        let is_artifact = self
            .columns
            .first()
            .map(|c| c.trim().is_empty() || c.starts_with("Unnamed: "))
            .unwrap_or(false);

        if !is_artifact {
            return false;
        }

        self.columns.remove(0);
        for row in &mut self.rows {
            row.remove(0);
        }
        true
    }

    // -----------------------------------------------------------------------
    // CSV encoding
    // -----------------------------------------------------------------------

    /// Reads a table with a header row. Ragged rows are a persistence error.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, RiverError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        if columns.is_empty() {
            return Err(RiverError::Persistence(
                "history table has no header row".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { columns, rows })
    }

    /// Writes the header and all rows. Site names containing commas are
    /// quoted.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), RiverError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// `["Time Stamp", site_1, site_2, ...]` for the given site order.
pub fn expected_header(sites: &[GaugeSite]) -> Vec<String> {
    std::iter::once(TIMESTAMP_COLUMN.to_string())
        .chain(sites.iter().map(|s| s.name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
