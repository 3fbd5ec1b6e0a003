//! Loading the regional table into typed [`Record`]s.

use crate::error::{EngineError, FormatError, Result};
use crate::record::{FIELD_COUNT, HEADER, Record};
use crate::source::{FileSource, TableSource};
use csv::{ReaderBuilder, StringRecord};
use std::str::FromStr;
use tracing::{debug, error, info};

/// Reads the table behind a [`TableSource`]. Holds no derived state, so every
/// call re-reads the source.
#[derive(Debug, Clone)]
pub struct RecordStore<S = FileSource> {
    source: S,
}

impl<S: TableSource> RecordStore<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loads every data row, skipping the header row.
    ///
    /// A missing or unreadable source is logged and yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Format`] if any row has the wrong number of
    /// fields or a non-blank, non-numeric count or ratio.
    pub fn load(&self) -> Result<Vec<Record>> {
        match self.try_load() {
            Err(EngineError::Storage { path, source }) => {
                error!(path = %path.display(), error = %source, "Table unavailable, continuing with no records");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Like [`RecordStore::load`], but storage failures are returned instead
    /// of degrading to an empty table.
    #[tracing::instrument(skip(self), fields(path = %self.source.location().display()))]
    pub fn try_load(&self) -> Result<Vec<Record>> {
        let location = self.source.location();
        let reader = self
            .source
            .open()
            .map_err(|e| EngineError::storage(location, e))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| EngineError::from_csv(location, e))?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            records.push(parse_record(&row, line)?);
        }

        info!(records = records.len(), "Table loaded");
        Ok(records)
    }

    /// Loads every row, header included, as the untouched source strings.
    ///
    /// # Errors
    ///
    /// Storage failures are returned, not degraded: the caller is about to
    /// write the rows back and must not mistake a missing table for an empty
    /// one.
    #[tracing::instrument(skip(self), fields(path = %self.source.location().display()))]
    pub fn load_as_raw_rows(&self) -> Result<Vec<Vec<String>>> {
        let location = self.source.location();
        let reader = self
            .source
            .open()
            .map_err(|e| EngineError::storage(location, e))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| EngineError::from_csv(location, e))?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        debug!(rows = rows.len(), "Raw rows loaded");
        Ok(rows)
    }
}

/// Converts one positional row into a [`Record`].
pub fn parse_record(row: &StringRecord, line: u64) -> std::result::Result<Record, FormatError> {
    if row.len() != FIELD_COUNT {
        return Err(FormatError::FieldCount {
            line,
            expected: FIELD_COUNT,
            found: row.len(),
        });
    }

    let field = |i: usize| row.get(i).unwrap_or_default();
    let int = |i: usize| parse_field::<i32>(field(i), HEADER[i], line);
    let count = |i: usize| parse_field::<u64>(field(i), HEADER[i], line);

    Ok(Record {
        date: field(0).to_string(),
        region: field(1).to_string(),
        retail_recreation: int(2)?,
        grocery_pharmacy: int(3)?,
        parks: int(4)?,
        transit: int(5)?,
        workplaces: int(6)?,
        residential: int(7)?,
        new_cases: count(8)?,
        total_cases: count(9)?,
        new_deaths: count(10)?,
        total_deaths: count(11)?,
    })
}

/// Parses a numeric field. Blank or whitespace-only values are `0`.
fn parse_field<T: FromStr + Default>(
    value: &str,
    column: &'static str,
    line: u64,
) -> std::result::Result<T, FormatError> {
    parse_or_zero(value).ok_or_else(|| FormatError::NotANumber {
        line,
        column,
        value: value.to_string(),
    })
}

/// Parses a user-entered count, treating blank input as `0`.
pub fn parse_count(value: &str) -> std::result::Result<u64, FormatError> {
    parse_or_zero(value).ok_or_else(|| FormatError::InvalidCount {
        value: value.to_string(),
    })
}

fn parse_or_zero<T: FromStr + Default>(value: &str) -> Option<T> {
    if value.trim().is_empty() {
        return Some(T::default());
    }
    value.parse().ok()
}
