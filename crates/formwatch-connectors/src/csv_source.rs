//! CSV export row source.
//!
//! Useful for replaying a downloaded form export or for local runs without
//! Sheets credentials. The file is re-read on every pass.

use crate::errors::ConnectorError;
use formwatch_core::errors::Result;
use formwatch_core::{Row, RowSource};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvRowSource {
    path: PathBuf,
    header_rows: usize,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>, header_rows: usize) -> Self {
        Self {
            path: path.into(),
            header_rows,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> std::result::Result<Vec<Row>, ConnectorError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records().skip(self.header_rows) {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

impl RowSource for CsvRowSource {
    fn fetch_all(&self) -> Result<Vec<Row>> {
        let rows = self.read().map_err(|e| {
            e.into_source_unavailable("fetch_all")
                .with_message(format!("{}: cannot read CSV export", self.path.display()))
        })?;
        debug!(path = %self.path.display(), rows = rows.len(), "Read CSV rows");
        Ok(rows)
    }
}
