//! Distinct observation dates of a loaded table.

use crate::query::in_range;
use crate::record::Record;
use std::collections::BTreeSet;

/// Every distinct record date, ascending.
///
/// ISO `yyyy-MM-dd` strings sort lexicographically in calendar order, so no
/// date parsing is needed.
pub fn distinct_sorted_dates(records: &[Record]) -> Vec<String> {
    let set: BTreeSet<&str> = records.iter().map(|r| r.date.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Sorted date list derived from one snapshot of the table. Rebuilt on
/// reload, never updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateIndex {
    dates: Vec<String>,
}

impl DateIndex {
    pub fn new(records: &[Record]) -> Self {
        Self {
            dates: distinct_sorted_dates(records),
        }
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.dates.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.dates.last().map(String::as_str)
    }

    pub fn contains(&self, date: &str) -> bool {
        self.dates
            .binary_search_by(|d| d.as_str().cmp(date))
            .is_ok()
    }

    /// Indexed dates inside the inclusive range `[start, end]`.
    pub fn range(&self, start: &str, end: &str) -> Vec<&str> {
        self.dates
            .iter()
            .map(String::as_str)
            .filter(|d| in_range(d, start, end))
            .collect()
    }
}
