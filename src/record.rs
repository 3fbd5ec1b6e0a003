//! The typed row of the regional time-series table.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Number of positional fields in every data row.
pub const FIELD_COUNT: usize = 12;

/// Column names in file order, as written in the header row.
pub const HEADER: [&str; FIELD_COUNT] = [
    "date",
    "area_name",
    "retail_recreation_gmr",
    "grocery_pharmacy_gmr",
    "parks_gmr",
    "transit_gmr",
    "workplaces_gmr",
    "residential_gmr",
    "new_cases",
    "total_cases",
    "new_deaths",
    "total_deaths",
];

/// One day of metrics for one region.
///
/// `date` is kept as the source's `yyyy-MM-dd` string, for which
/// lexicographic and chronological order coincide. Mobility ratios are
/// percentage change from baseline. The cumulative totals are read verbatim
/// from the source and never recomputed during load.
///
/// Nothing guarantees one row per `(date, region)`; duplicates are kept as
/// separate records in file order and their meaning is undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub date: String,
    pub region: String,
    pub retail_recreation: i32,
    pub grocery_pharmacy: i32,
    pub parks: i32,
    pub transit: i32,
    pub workplaces: i32,
    pub residential: i32,
    pub new_cases: u64,
    pub total_cases: u64,
    pub new_deaths: u64,
    pub total_deaths: u64,
}

/// The columns a per-region table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    RetailRecreation,
    GroceryPharmacy,
    Parks,
    Transit,
    Workplaces,
    Residential,
    NewCases,
    TotalCases,
    NewDeaths,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Date,
        Column::RetailRecreation,
        Column::GroceryPharmacy,
        Column::Parks,
        Column::Transit,
        Column::Workplaces,
        Column::Residential,
        Column::NewCases,
        Column::TotalCases,
        Column::NewDeaths,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::RetailRecreation => "retail-recreation",
            Column::GroceryPharmacy => "grocery-pharmacy",
            Column::Parks => "parks",
            Column::Transit => "transit",
            Column::Workplaces => "workplaces",
            Column::Residential => "residential",
            Column::NewCases => "new-cases",
            Column::TotalCases => "total-cases",
            Column::NewDeaths => "new-deaths",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Column::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Column::ALL.iter().map(|c| c.name()).collect();
                format!("unknown column '{s}', expected one of: {}", names.join(", "))
            })
    }
}
