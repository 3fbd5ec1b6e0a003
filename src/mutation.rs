//! Manual entry of new daily rows and write-back of the whole table.
//!
//! The log works on the raw string rows so that persisted pre-existing rows
//! are byte-for-byte what was read (leading zeros, blanks and all). It is the
//! only writer of the table and is not safe to share between concurrent
//! writers; callers serialize the load → append → persist cycle.

use crate::error::{EngineError, FormatError, Result};
use crate::record::{FIELD_COUNT, HEADER};
use crate::source::{FileSource, TableSource};
use crate::store::{RecordStore, parse_count};
use chrono::Local;
use csv::WriterBuilder;
use tracing::{debug, error, info};

const REGION_COLUMN: usize = 1;
const TOTAL_CASES_COLUMN: usize = 9;
const TOTAL_DEATHS_COLUMN: usize = 11;

pub struct MutationLog<S = FileSource> {
    store: RecordStore<S>,
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    pending: usize,
}

impl<S: TableSource> MutationLog<S> {
    /// Reads the current table through `store`.
    ///
    /// # Errors
    ///
    /// Fails if the table cannot be read. An absent table is not treated as
    /// empty here, since persisting would then wipe it.
    pub fn open(store: RecordStore<S>) -> Result<Self> {
        let mut rows = store.load_as_raw_rows()?;
        let header = if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        };

        debug!(rows = rows.len(), "Mutation log opened");
        Ok(Self {
            store,
            header,
            rows,
            pending: 0,
        })
    }

    /// Data rows, pre-existing first, then appended ones.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Rows appended since open or the last successful persist.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Highest `total_cases` seen for `region` in any row, or 0.
    pub fn current_total_cases(&self, region: &str) -> Result<u64> {
        self.max_for_region(region, TOTAL_CASES_COLUMN)
    }

    /// Highest `total_deaths` seen for `region` in any row, or 0.
    pub fn current_total_deaths(&self, region: &str) -> Result<u64> {
        self.max_for_region(region, TOTAL_DEATHS_COLUMN)
    }

    /// Appends a row for `region` on `date`.
    ///
    /// The running totals are the region's maximum totals so far plus the
    /// new counts. Mobility ratios are left blank. The counts are stored as
    /// given, so a blank count stays blank in the file.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidCount`] if either count is non-blank
    /// and not a non-negative integer, and [`FormatError::CountOverflow`] if
    /// a running total would no longer fit. Nothing is appended in either
    /// case.
    pub fn append(&mut self, date: &str, region: &str, new_cases: &str, new_deaths: &str) -> Result<&[String]> {
        let cases = parse_count(new_cases)?;
        let deaths = parse_count(new_deaths)?;

        let total_cases = self
            .current_total_cases(region)?
            .checked_add(cases)
            .ok_or_else(|| FormatError::CountOverflow {
                column: HEADER[TOTAL_CASES_COLUMN],
                value: new_cases.to_string(),
            })?;
        let total_deaths = self
            .current_total_deaths(region)?
            .checked_add(deaths)
            .ok_or_else(|| FormatError::CountOverflow {
                column: HEADER[TOTAL_DEATHS_COLUMN],
                value: new_deaths.to_string(),
            })?;

        let mut row = Vec::with_capacity(FIELD_COUNT);
        row.push(date.to_string());
        row.push(region.to_string());
        row.extend(std::iter::repeat_n(String::new(), 6));
        row.push(new_cases.to_string());
        row.push(total_cases.to_string());
        row.push(new_deaths.to_string());
        row.push(total_deaths.to_string());

        info!(date, region, total_cases, total_deaths, "Row appended");

        self.rows.push(row);
        self.pending += 1;
        Ok(self.rows.last().map(Vec::as_slice).unwrap_or_default())
    }

    /// [`MutationLog::append`] stamped with today's local date.
    pub fn append_today(&mut self, region: &str, new_cases: &str, new_deaths: &str) -> Result<&[String]> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        self.append(&today, region, new_cases, new_deaths)
    }

    /// Overwrites the source with the header and every row.
    ///
    /// Failures are logged and returned; the in-memory rows are kept so the
    /// caller can retry.
    #[tracing::instrument(skip(self), fields(path = %self.store.source().location().display(), pending = self.pending))]
    pub fn persist(&mut self) -> Result<()> {
        match self.write_table() {
            Ok(()) => {
                info!(rows = self.rows.len(), "Table persisted");
                self.pending = 0;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to persist table");
                Err(e)
            }
        }
    }

    fn write_table(&self) -> Result<()> {
        let location = self.store.source().location();

        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        let header = self
            .header
            .clone()
            .unwrap_or_else(|| HEADER.iter().map(|h| h.to_string()).collect());
        writer
            .write_record(&header)
            .map_err(|e| EngineError::from_csv(location, e))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| EngineError::from_csv(location, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| EngineError::storage(location, e.into_error()))?;

        self.store
            .source()
            .store(&bytes)
            .map_err(|e| EngineError::storage(location, e))
    }

    fn max_for_region(&self, region: &str, column: usize) -> Result<u64> {
        let mut max = 0u64;
        for (i, row) in self.rows.iter().enumerate() {
            if row.get(REGION_COLUMN).map(String::as_str) != Some(region) {
                continue;
            }
            let value = row.get(column).map(String::as_str).unwrap_or_default();
            let total = parse_count(value).map_err(|_| FormatError::NotANumber {
                line: i as u64 + 2,
                column: HEADER[column],
                value: value.to_string(),
            })?;
            max = max.max(total);
        }
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TABLE: &str = "\
date,area_name,retail,grocery,parks,transit,workplaces,residential,new_cases,total_cases,new_deaths,total_deaths
2022-06-29,Camden,-31,-14,15,-9,-37,7,92,74692,0,363
2022-06-28,Camden,-20,-10,10,-8,-30,6,080,74600,1,363
2022-06-30,Redbridge,-15,-3,4,-32,-37,5,79,102321,0,933
";

    fn open_with(content: &str) -> (tempfile::TempDir, MutationLog) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covid.csv");
        fs::write(&path, content).unwrap();
        let log = MutationLog::open(RecordStore::new(FileSource::new(path))).unwrap();
        (dir, log)
    }

    #[test]
    fn test_current_totals_take_maximum() {
        let (_dir, log) = open_with(TABLE);

        assert_eq!(log.current_total_cases("Camden").unwrap(), 74692);
        assert_eq!(log.current_total_deaths("Camden").unwrap(), 363);
        assert_eq!(log.current_total_cases("Barnet").unwrap(), 0);
    }

    #[test]
    fn test_append_computes_totals_and_blanks_mobility() {
        let (_dir, mut log) = open_with(TABLE);

        let row = log.append("2022-07-01", "Camden", "10", "1").unwrap().to_vec();

        assert_eq!(row.len(), FIELD_COUNT);
        assert_eq!(row[0], "2022-07-01");
        assert_eq!(row[1], "Camden");
        assert!(row[2..8].iter().all(String::is_empty));
        assert_eq!(row[8], "10");
        assert_eq!(row[9], "74702");
        assert_eq!(row[10], "1");
        assert_eq!(row[11], "364");
        assert_eq!(log.pending(), 1);
    }

    #[test]
    fn test_append_blank_counts_are_zero() {
        let (_dir, mut log) = open_with(TABLE);

        let row = log.append("2022-07-01", "Redbridge", "", " ").unwrap().to_vec();

        assert_eq!(row[9], "102321");
        assert_eq!(row[11], "933");
    }

    #[test]
    fn test_append_rejects_non_numeric() {
        let (_dir, mut log) = open_with(TABLE);

        let err = log.append("2022-07-01", "Camden", "ten", "1").unwrap_err();

        assert!(matches!(
            err,
            EngineError::Format(FormatError::InvalidCount { .. })
        ));
        assert_eq!(log.rows().len(), 3);
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_append_rejects_total_overflow() {
        let (_dir, mut log) = open_with(TABLE);

        let err = log
            .append("2022-07-01", "Camden", "18446744073709551615", "1")
            .unwrap_err();

        match err {
            EngineError::Format(FormatError::CountOverflow { column, value }) => {
                assert_eq!(column, "total_cases");
                assert_eq!(value, "18446744073709551615");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(log.rows().len(), 3);
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_append_accepts_count_up_to_limit() {
        let (_dir, mut log) = open_with(TABLE);
        let headroom = (u64::MAX - 933).to_string();

        let row = log.append("2022-07-01", "Redbridge", "0", &headroom).unwrap().to_vec();

        assert_eq!(row[11], u64::MAX.to_string());
    }

    #[test]
    fn test_append_today_uses_iso_date() {
        let (_dir, mut log) = open_with(TABLE);

        let row = log.append_today("Camden", "1", "0").unwrap().to_vec();

        assert_eq!(row[0], Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_persist_round_trips_raw_rows() {
        let (dir, mut log) = open_with(TABLE);
        log.append("2022-07-01", "Camden", "10", "1").unwrap();

        log.persist().unwrap();

        let written = fs::read_to_string(dir.path().join("covid.csv")).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("date,area_name"));
        assert_eq!(lines[2], "2022-06-28,Camden,-20,-10,10,-8,-30,6,080,74600,1,363");
        assert_eq!(lines[4], "2022-07-01,Camden,,,,,,,10,74702,1,364");
        assert_eq!(log.pending(), 0);
    }

    #[test]
    fn test_open_missing_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(FileSource::new(dir.path().join("missing.csv")));

        assert!(matches!(
            MutationLog::open(store),
            Err(EngineError::Storage { .. })
        ));
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let (dir, mut log) = open_with(TABLE);
        log.append("2022-07-01", "Camden", "1", "0").unwrap();
        fs::remove_dir_all(dir.path()).unwrap();

        assert!(log.persist().is_err());
        assert_eq!(log.pending(), 1);
    }
}
