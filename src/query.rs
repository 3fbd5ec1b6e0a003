//! Region and date-range selection over a record snapshot.
//!
//! Filters are stable and never re-sort their input. Neither filter checks
//! that `start <= end`; an inverted range simply matches nothing (or only the
//! records dated exactly `start` or `end`). Range validation belongs to the
//! caller, see [`crate::engine::Engine`].

use crate::record::{Column, Record};

/// Inclusive range test on ISO date strings.
///
/// Written as "equal to either bound, or strictly between them" rather than a
/// single `>=`/`<=` pair; for a valid range the two are equivalent.
pub fn in_range(date: &str, start: &str, end: &str) -> bool {
    if date == start || date == end {
        return true;
    }
    date > start && date < end
}

/// Records of `region` dated within `[start, end]`.
pub fn by_region_and_range(records: &[Record], region: &str, start: &str, end: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.region == region && in_range(&r.date, start, end))
        .cloned()
        .collect()
}

/// Records of every region dated within `[start, end]`.
pub fn by_range(records: &[Record], start: &str, end: &str) -> Vec<Record> {
    records
        .iter()
        .filter(|r| in_range(&r.date, start, end))
        .cloned()
        .collect()
}

/// Stable ascending sort on one displayed column.
pub fn sort_by_column(records: &mut [Record], column: Column) {
    match column {
        Column::Date => records.sort_by(|a, b| a.date.cmp(&b.date)),
        Column::RetailRecreation => records.sort_by_key(|r| r.retail_recreation),
        Column::GroceryPharmacy => records.sort_by_key(|r| r.grocery_pharmacy),
        Column::Parks => records.sort_by_key(|r| r.parks),
        Column::Transit => records.sort_by_key(|r| r.transit),
        Column::Workplaces => records.sort_by_key(|r| r.workplaces),
        Column::Residential => records.sort_by_key(|r| r.residential),
        Column::NewCases => records.sort_by_key(|r| r.new_cases),
        Column::TotalCases => records.sort_by_key(|r| r.total_cases),
        Column::NewDeaths => records.sort_by_key(|r| r.new_deaths),
    }
}
