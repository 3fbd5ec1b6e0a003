//! Facade the presentation layer talks to.
//!
//! Holds one loaded snapshot of the table with its [`DateIndex`] and answers
//! region, period, statistics and severity queries over it. Caller-supplied
//! dates are validated here; the query functions underneath trust their
//! inputs.

use crate::analyzers::aggregate::summarize;
use crate::analyzers::severity::SeverityClassifier;
use crate::analyzers::types::{PeriodSummary, SeverityMap};
use crate::config::{Config, RegionConfig};
use crate::dates::DateIndex;
use crate::error::{EngineError, FormatError, Result};
use crate::mutation::MutationLog;
use crate::query::{by_range, by_region_and_range};
use crate::record::Record;
use crate::source::{FileSource, TableSource};
use crate::store::RecordStore;
use chrono::NaiveDate;
use tracing::{info, warn};

/// Checks that `date` is a canonical `yyyy-MM-dd` calendar date.
pub fn validate_date(date: &str) -> std::result::Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .filter(|d| d.format("%Y-%m-%d").to_string() == date)
        .ok_or_else(|| FormatError::InvalidDate {
            value: date.to_string(),
        })
}

/// Checks both bounds and that `start` is not after `end`.
pub fn validate_range(start: &str, end: &str) -> Result<()> {
    let from = validate_date(start)?;
    let to = validate_date(end)?;
    if from > to {
        return Err(EngineError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

pub struct Engine<S = FileSource> {
    store: RecordStore<S>,
    classifier: SeverityClassifier,
    records: Vec<Record>,
    dates: DateIndex,
}

impl Engine<FileSource> {
    pub fn open(config: &Config) -> Result<Self> {
        Self::with_source(FileSource::new(&config.data_path), config.regions.clone())
    }
}

impl<S: TableSource + Clone> Engine<S> {
    /// Loads the table and derives the date index.
    ///
    /// An unreadable table yields an engine with no records.
    pub fn with_source(source: S, regions: RegionConfig) -> Result<Self> {
        let classifier = SeverityClassifier::new(regions)?;
        let store = RecordStore::new(source);
        let records = store.load()?;
        let dates = DateIndex::new(&records);

        if records.is_empty() {
            warn!("Engine started with an empty table");
        }

        Ok(Self {
            store,
            classifier,
            records,
            dates,
        })
    }

    /// Re-reads the table and rebuilds the date index.
    pub fn reload(&mut self) -> Result<()> {
        let records = self.store.load()?;
        self.dates = DateIndex::new(&records);
        self.records = records;
        info!(records = self.records.len(), dates = self.dates.len(), "Engine reloaded");
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn dates(&self) -> &DateIndex {
        &self.dates
    }

    pub fn regions(&self) -> &RegionConfig {
        self.classifier.regions()
    }

    /// Records for one region in `[start, end]`, in table order.
    pub fn region_data(&self, region: &str, start: &str, end: &str) -> Result<Vec<Record>> {
        validate_range(start, end)?;
        Ok(by_region_and_range(&self.records, region, start, end))
    }

    /// Records for every region in `[start, end]`, in table order.
    pub fn period_data(&self, start: &str, end: &str) -> Result<Vec<Record>> {
        validate_range(start, end)?;
        Ok(by_range(&self.records, start, end))
    }

    pub fn period_summary(&self, start: &str, end: &str) -> Result<PeriodSummary> {
        let records = self.period_data(start, end)?;
        Ok(summarize(start, end, &records))
    }

    /// Severity tier of every configured region by death toll over the period.
    pub fn severity_map(&self, start: &str, end: &str) -> Result<SeverityMap> {
        validate_range(start, end)?;
        Ok(self.classifier.classify_deaths(&self.records, start, end))
    }

    /// Opens a fresh mutation log over the same table.
    pub fn mutation_log(&self) -> Result<MutationLog<S>> {
        MutationLog::open(RecordStore::new(self.store.source().clone()))
    }

    /// Appends one manual entry, persists the table and reloads.
    ///
    /// `date` defaults to today. The region must be one of the configured
    /// regions.
    pub fn add_entry(&mut self, date: Option<&str>, region: &str, new_cases: &str, new_deaths: &str) -> Result<Vec<String>> {
        if !self.regions().contains(region) {
            return Err(EngineError::UnknownRegion(region.to_string()));
        }

        let mut log = self.mutation_log()?;
        let row = match date {
            Some(d) => {
                validate_date(d)?;
                log.append(d, region, new_cases, new_deaths)?.to_vec()
            }
            None => log.append_today(region, new_cases, new_deaths)?.to_vec(),
        };
        log.persist()?;
        self.reload()?;
        Ok(row)
    }
}
