use crate::analyzers::types::PeriodSummary;
use crate::analyzers::utility::mean;
use crate::record::Record;

/// Sum of `total_deaths` over every row.
///
/// `total_deaths` is already cumulative per region, so a region present on
/// several days is counted once per day. This is the figure the dashboard
/// has always shown and is kept as-is. Saturates at `u64::MAX`.
pub fn sum_total_deaths(records: &[Record]) -> u64 {
    saturating_sum(records.iter().map(|r| r.total_deaths))
}

/// Mean of `total_cases`. Returns 0.0 for empty input.
pub fn mean_total_cases(records: &[Record]) -> f64 {
    let values: Vec<f64> = records.iter().map(|r| r.total_cases as f64).collect();
    mean(&values)
}

/// Mean of the parks ratio averaged with the mean of the workplaces ratio.
///
/// Computed as a mean of means, `(mean(parks) + mean(workplaces)) / 2`.
pub fn mean_parks_and_workplaces(records: &[Record]) -> f64 {
    mean_of_means(records, |r| r.parks, |r| r.workplaces)
}

/// Mean of the residential ratio averaged with the mean of the transit ratio.
pub fn mean_residential_and_transit(records: &[Record]) -> f64 {
    mean_of_means(records, |r| r.residential, |r| r.transit)
}

/// Deaths reported during the period: the sum of `new_deaths`. Saturates at
/// `u64::MAX`.
pub fn added_deaths(records: &[Record]) -> u64 {
    saturating_sum(records.iter().map(|r| r.new_deaths))
}

/// Bundles the four headline statistics for `[start, end]`.
///
/// `records` is expected to be already filtered to that range.
pub fn summarize(start: &str, end: &str, records: &[Record]) -> PeriodSummary {
    PeriodSummary {
        start: start.to_string(),
        end: end.to_string(),
        records: records.len(),
        sum_total_deaths: sum_total_deaths(records),
        mean_total_cases: mean_total_cases(records),
        mean_parks_and_workplaces: mean_parks_and_workplaces(records),
        mean_residential_and_transit: mean_residential_and_transit(records),
    }
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

fn mean_of_means(records: &[Record], a: fn(&Record) -> i32, b: fn(&Record) -> i32) -> f64 {
    let first: Vec<f64> = records.iter().map(|r| a(r) as f64).collect();
    let second: Vec<f64> = records.iter().map(|r| b(r) as f64).collect();
    (mean(&first) + mean(&second)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn record(
        date: &str,
        region: &str,
        parks: i32,
        transit: i32,
        workplaces: i32,
        residential: i32,
        total_cases: u64,
        new_deaths: u64,
        total_deaths: u64,
    ) -> Record {
        Record {
            date: date.to_string(),
            region: region.to_string(),
            retail_recreation: 0,
            grocery_pharmacy: 0,
            parks,
            transit,
            workplaces,
            residential,
            new_cases: 0,
            total_cases,
            new_deaths,
            total_deaths,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("2022-06-30", "Redbridge", 4, -32, -37, 5, 102321, 0, 933),
            record("2022-06-30", "Greenwich", -1, -18, -38, 6, 92920, 0, 582),
            record("2022-06-29", "Camden", 15, -9, -37, 7, 74692, 0, 363),
            record("2022-06-29", "Redbridge", 5, -28, -39, 5, 102242, 0, 933),
            record("2022-06-29", "Enfield", 14, -38, -30, 5, 98644, 0, 758),
            record("2022-06-28", "Richmond Upon Thames", 14, -32, -48, 7, 68537, 0, 375),
            record("2022-06-28", "Waltham Forest", 8, -33, -36, 5, 91943, 0, 634),
            record("2022-06-27", "Harrow", 83, -16, -22, 7, 83586, 1, 648),
            record("2022-06-27", "Hounslow", 26, -19, -27, 5, 96811, 0, 710),
            record("2022-06-27", "Haringey", -3, -31, -40, 6, 85131, 0, 507),
        ]
    }

    #[test]
    fn test_sum_total_deaths() {
        assert_eq!(sum_total_deaths(&sample()), 6443);
        assert_eq!(sum_total_deaths(&[]), 0);
    }

    #[test]
    fn test_mean_total_cases() {
        assert!((mean_total_cases(&sample()) - 89682.7).abs() < 0.001);
    }

    #[test]
    fn test_mean_total_cases_empty_is_zero() {
        assert_eq!(mean_total_cases(&[]), 0.0);
    }

    #[test]
    fn test_mean_total_cases_single_record() {
        let one = &sample()[2..3];
        assert_eq!(mean_total_cases(one), 74692.0);
    }

    #[test]
    fn test_mean_parks_and_workplaces() {
        assert!((mean_parks_and_workplaces(&sample()) - -9.45).abs() < 0.001);
        assert_eq!(mean_parks_and_workplaces(&[]), 0.0);
    }

    #[test]
    fn test_mean_residential_and_transit() {
        assert!((mean_residential_and_transit(&sample()) - -9.9).abs() < 0.001);
        assert_eq!(mean_residential_and_transit(&[]), 0.0);
    }

    #[test]
    fn test_added_deaths_sums_new_deaths() {
        assert_eq!(added_deaths(&sample()), 1);
    }

    #[test]
    fn test_sums_saturate_instead_of_wrapping() {
        let mut huge = sample();
        huge[0].total_deaths = u64::MAX;
        huge[0].new_deaths = u64::MAX;

        assert_eq!(sum_total_deaths(&huge), u64::MAX);
        assert_eq!(added_deaths(&huge), u64::MAX);
    }

    #[test]
    fn test_duplicate_rows_are_each_counted() {
        let mut records = sample();
        records.push(records[2].clone());

        assert_eq!(sum_total_deaths(&records), 6443 + 363);
        assert!((mean_total_cases(&records) - (896827.0 + 74692.0) / 11.0).abs() < 0.001);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize("2022-06-27", "2022-06-30", &sample());

        assert_eq!(summary.records, 10);
        assert_eq!(summary.sum_total_deaths, 6443);
        assert_eq!(summary.start, "2022-06-27");
        assert!((summary.mean_residential_and_transit - -9.9).abs() < 0.001);
    }
}
