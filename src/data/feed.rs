//! Wide-format case feed: one row per region, one column per date.

use crate::error::{DataError, DataResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const REGION_COLUMN: &str = "Country/Region";
pub const SUB_REGION_COLUMN: &str = "Province/State";

/// Columns that describe the region rather than a date
pub const METADATA_COLUMNS: [&str; 4] = [SUB_REGION_COLUMN, REGION_COLUMN, "Lat", "Long"];

pub fn is_metadata_column(label: &str) -> bool {
    METADATA_COLUMNS.contains(&label.trim())
}

/// One input record. `cells` are aligned with [`Feed::date_labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub region: String,
    pub sub_region: Option<String>,
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(region: impl Into<String>, sub_region: Option<String>, cells: Vec<String>) -> Self {
        Self {
            region: region.into(),
            sub_region,
            cells,
        }
    }

    /// Raw cell for a value column; short rows read as missing
    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// The loaded feed. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    date_labels: Vec<String>,
    rows: Vec<RawRow>,
}

impl Feed {
    pub fn new(date_labels: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { date_labels, rows }
    }

    pub fn open(path: &Path) -> DataResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse CSV with a header row. Every header that is not a metadata
    /// column is kept as a candidate date label, parseable or not.
    pub fn from_reader<R: Read>(reader: R) -> DataResult<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers()?.clone();

        let region_idx = headers
            .iter()
            .position(|h| h.trim() == REGION_COLUMN)
            .ok_or(DataError::MissingColumn(REGION_COLUMN))?;
        let sub_region_idx = headers.iter().position(|h| h.trim() == SUB_REGION_COLUMN);

        let value_columns: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_metadata_column(h))
            .map(|(i, _)| i)
            .collect();
        let date_labels = value_columns
            .iter()
            .map(|&i| headers[i].trim().to_string())
            .collect();

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for record in csv.records() {
            let record = record?;
            let region = record.get(region_idx).unwrap_or("");
            if region.trim().is_empty() {
                skipped += 1;
                continue;
            }

            let sub_region = sub_region_idx
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let cells = value_columns
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect();

            rows.push(RawRow::new(region, sub_region, cells));
        }

        if skipped > 0 {
            tracing::debug!(skipped, "dropped feed rows without a region");
        }

        Ok(Self { date_labels, rows })
    }

    pub fn date_labels(&self) -> &[String] {
        &self.date_labels
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
