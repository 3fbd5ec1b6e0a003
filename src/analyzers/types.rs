//! Data types produced by the statistics and classification functions.

use serde::Serialize;
use std::fmt;

/// The four headline statistics for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub start: String,
    pub end: String,
    pub records: usize,
    pub sum_total_deaths: u64,
    pub mean_total_cases: f64,
    pub mean_parks_and_workplaces: f64,
    pub mean_residential_and_transit: f64,
}

/// Severity band of a region relative to the expected per-region share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
        };
        f.write_str(s)
    }
}

/// One region's metric over a period and the tier it falls in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSeverity {
    pub region: String,
    pub value: u64,
    pub tier: SeverityTier,
}

/// A legend band: the tier and the inclusive metric bounds it covers.
///
/// `upper` is `None` for the open-ended top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub tier: SeverityTier,
    pub lower: u64,
    pub upper: Option<u64>,
    pub description: String,
}

/// Classification of every configured region over one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityMap {
    pub start: String,
    pub end: String,
    /// Metric summed over every record in the period, all regions.
    pub total: u64,
    /// `total` divided by the configured region count.
    pub expected_share: u64,
    pub regions: Vec<RegionSeverity>,
    pub legend: Vec<LegendEntry>,
}

impl SeverityMap {
    pub fn tier_of(&self, region: &str) -> Option<SeverityTier> {
        self.regions
            .iter()
            .find(|r| r.region == region)
            .map(|r| r.tier)
    }

    pub fn count(&self, tier: SeverityTier) -> usize {
        self.regions.iter().filter(|r| r.tier == tier).count()
    }
}
