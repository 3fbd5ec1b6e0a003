//! Three-tier severity banding of regions.
//!
//! A region's metric `v` over a period is compared with the expected share
//! `E = total / region_count`, where `total` covers every record in the
//! period and `region_count` is the configured number of regions (not the
//! number that actually reported data). `E` is an integer quotient.
//!
//! | Range                      | Tier   |
//! |----------------------------|--------|
//! | `v == 0` or `v <= 0.8 * E` | LOW    |
//! | `v <= 1.2 * E`             | MEDIUM |
//! | `v > 1.2 * E`              | HIGH   |

use crate::analyzers::aggregate::added_deaths;
use crate::analyzers::types::{LegendEntry, RegionSeverity, SeverityMap, SeverityTier};
use crate::config::RegionConfig;
use crate::error::ConfigError;
use crate::query::{by_range, by_region_and_range};
use crate::record::Record;
use tracing::debug;

const LOW_FACTOR: f64 = 0.8;
const HIGH_FACTOR: f64 = 1.2;

/// Buckets `value` against the per-region `expected_share`.
pub fn tier_for(value: u64, expected_share: u64) -> SeverityTier {
    let value = value as f64;
    let expected = expected_share as f64;

    match value {
        v if v == 0.0 || v <= expected * LOW_FACTOR => SeverityTier::Low,
        v if v <= expected * HIGH_FACTOR => SeverityTier::Medium,
        _ => SeverityTier::High,
    }
}

/// Legend bands for a period whose metric summed to `total`.
///
/// Bounds use real division, so they can differ by one from the integer
/// share used by [`tier_for`]. The MEDIUM band is dropped when no integer
/// lies strictly between the LOW and HIGH bounds, and the HIGH band is
/// dropped when `total` is zero.
pub fn legend(total: u64, region_count: usize) -> Vec<LegendEntry> {
    let count = region_count.max(1) as f64;
    let low_max = (total as f64 * LOW_FACTOR / count).floor() as u64;
    let high_min = (total as f64 * HIGH_FACTOR / count).ceil() as u64;

    let mut bands = vec![LegendEntry {
        tier: SeverityTier::Low,
        lower: 0,
        upper: Some(low_max),
        description: format!("{low_max} or less deaths over the selected duration"),
    }];

    if high_min > low_max + 1 {
        let lower = low_max + 1;
        let upper = high_min - 1;
        let description = if lower == upper {
            format!("{lower} death(s) over the selected duration")
        } else {
            format!("Between {lower} and {upper} deaths")
        };
        bands.push(LegendEntry {
            tier: SeverityTier::Medium,
            lower,
            upper: Some(upper),
            description,
        });
    }

    if total != 0 {
        bands.push(LegendEntry {
            tier: SeverityTier::High,
            lower: high_min,
            upper: None,
            description: format!("{high_min} or more deaths over the selected duration"),
        });
    }

    bands
}

/// Classifies every configured region over a period.
#[derive(Debug, Clone)]
pub struct SeverityClassifier {
    regions: RegionConfig,
}

impl SeverityClassifier {
    pub fn new(regions: RegionConfig) -> Result<Self, ConfigError> {
        regions.validate()?;
        Ok(Self { regions })
    }

    pub fn regions(&self) -> &RegionConfig {
        &self.regions
    }

    pub fn expected_share(&self, total: u64) -> u64 {
        total / self.regions.region_count as u64
    }

    /// Tiers by death toll (sum of `new_deaths`) over `[start, end]`.
    pub fn classify_deaths(&self, records: &[Record], start: &str, end: &str) -> SeverityMap {
        self.classify_period(records, start, end, added_deaths)
    }

    /// Tiers by an arbitrary period metric over `[start, end]`.
    ///
    /// Regions are reported in configuration order. A region with no records
    /// in the period has a metric of `metric(&[])`.
    pub fn classify_period<F>(&self, records: &[Record], start: &str, end: &str, metric: F) -> SeverityMap
    where
        F: Fn(&[Record]) -> u64,
    {
        let total = metric(&by_range(records, start, end));
        let expected_share = self.expected_share(total);

        let regions: Vec<RegionSeverity> = self
            .regions
            .names
            .iter()
            .map(|name| {
                let value = metric(&by_region_and_range(records, name, start, end));
                RegionSeverity {
                    region: name.clone(),
                    value,
                    tier: tier_for(value, expected_share),
                }
            })
            .collect();

        debug!(start, end, total, expected_share, regions = regions.len(), "Regions classified");

        SeverityMap {
            start: start.to_string(),
            end: end.to_string(),
            total,
            expected_share,
            regions,
            legend: legend(total, self.regions.region_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, region: &str, new_deaths: u64) -> Record {
        Record {
            date: date.to_string(),
            region: region.to_string(),
            retail_recreation: 0,
            grocery_pharmacy: 0,
            parks: 0,
            transit: 0,
            workplaces: 0,
            residential: 0,
            new_cases: 0,
            total_cases: 0,
            new_deaths,
            total_deaths: 0,
        }
    }

    fn regions(names: &[&str], region_count: usize) -> RegionConfig {
        RegionConfig {
            names: names.iter().map(|s| s.to_string()).collect(),
            region_count,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for(0, 10), SeverityTier::Low);
        assert_eq!(tier_for(8, 10), SeverityTier::Low);
        assert_eq!(tier_for(9, 10), SeverityTier::Medium);
        assert_eq!(tier_for(12, 10), SeverityTier::Medium);
        assert_eq!(tier_for(13, 10), SeverityTier::High);
    }

    #[test]
    fn test_zero_share_puts_any_death_high() {
        assert_eq!(tier_for(0, 0), SeverityTier::Low);
        assert_eq!(tier_for(1, 0), SeverityTier::High);
    }

    #[test]
    fn test_expected_share_uses_configured_count() {
        let classifier = SeverityClassifier::new(regions(&["A", "B"], 33)).unwrap();
        assert_eq!(classifier.expected_share(330), 10);
        assert_eq!(classifier.expected_share(65), 1);
    }

    #[test]
    fn test_zero_region_count_rejected() {
        assert!(SeverityClassifier::new(regions(&["A"], 0)).is_err());
    }

    #[test]
    fn test_classify_period_with_fixed_denominator() {
        // total 40 over a configured count of 4 gives a share of 10
        let records = vec![
            record("2022-06-01", "A", 8),
            record("2022-06-02", "B", 12),
            record("2022-06-02", "C", 20),
            record("2022-07-01", "C", 100),
        ];
        let classifier = SeverityClassifier::new(regions(&["A", "B", "C", "D"], 4)).unwrap();

        let map = classifier.classify_deaths(&records, "2022-06-01", "2022-06-30");

        assert_eq!(map.total, 40);
        assert_eq!(map.expected_share, 10);
        assert_eq!(map.tier_of("A"), Some(SeverityTier::Low));
        assert_eq!(map.tier_of("B"), Some(SeverityTier::Medium));
        assert_eq!(map.tier_of("C"), Some(SeverityTier::High));
        assert_eq!(map.tier_of("D"), Some(SeverityTier::Low));
        assert_eq!(map.count(SeverityTier::Low), 2);
    }

    #[test]
    fn test_classify_period_custom_metric() {
        let records = vec![record("2022-06-01", "A", 1), record("2022-06-01", "B", 1)];
        let classifier = SeverityClassifier::new(regions(&["A", "B"], 2)).unwrap();

        let map = classifier.classify_period(&records, "2022-06-01", "2022-06-01", |rs| {
            rs.len() as u64 * 5
        });

        assert_eq!(map.total, 10);
        assert_eq!(map.expected_share, 5);
        assert!(map.regions.iter().all(|r| r.tier == SeverityTier::Medium));
    }

    #[test]
    fn test_legend_three_bands() {
        let bands = legend(330, 33);

        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0].upper, Some(8));
        assert_eq!(bands[1].lower, 9);
        assert_eq!(bands[1].upper, Some(11));
        assert_eq!(bands[1].description, "Between 9 and 11 deaths");
        assert_eq!(bands[2].lower, 12);
        assert_eq!(bands[2].upper, None);
    }

    #[test]
    fn test_legend_single_value_medium() {
        let bands = legend(33, 33);

        assert_eq!(bands.len(), 3);
        assert_eq!(bands[1].description, "1 death(s) over the selected duration");
    }

    #[test]
    fn test_legend_no_deaths() {
        let bands = legend(0, 33);

        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].tier, SeverityTier::Low);
        assert_eq!(bands[0].description, "0 or less deaths over the selected duration");
    }
}
