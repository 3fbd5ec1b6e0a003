//! Output formatting and export for query results.
//!
//! Renders summaries and severity maps as text, prints JSON, and exports CSV.

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::analyzers::types::{PeriodSummary, SeverityMap};
use crate::record::Record;

/// Writes a value to stdout as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes records as CSV, header row first.
pub fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports records to a CSV file, replacing any existing file.
pub fn export_records(path: &str, records: &[Record]) -> Result<()> {
    debug!(path, records = records.len(), "Exporting records");
    let file = File::create(path)?;
    write_records(file, records)?;
    info!(path, records = records.len(), "Records exported");
    Ok(())
}

/// Renders a period summary as aligned text lines.
pub fn format_summary(summary: &PeriodSummary) -> String {
    format!(
        "Period {} to {} ({} records)\n\
         Total deaths (sum of cumulative):  {}\n\
         Average total cases:               {:.2}\n\
         Parks and workplaces mobility:     {:.2}\n\
         Residential and transit mobility:  {:.2}",
        summary.start,
        summary.end,
        summary.records,
        summary.sum_total_deaths,
        summary.mean_total_cases,
        summary.mean_parks_and_workplaces,
        summary.mean_residential_and_transit,
    )
}

/// Renders a severity map as one line per region followed by the legend.
pub fn format_severity(map: &SeverityMap) -> String {
    let width = map.regions.iter().map(|r| r.region.len()).max().unwrap_or(0);
    let mut out = format!(
        "Deaths {} to {}: total {}, expected share {}\n",
        map.start, map.end, map.total, map.expected_share
    );
    for r in &map.regions {
        out.push_str(&format!("{:<width$}  {:>6}  {}\n", r.region, r.value, r.tier));
    }
    for band in &map.legend {
        out.push_str(&format!("[{}] {}\n", band.tier, band.description));
    }
    out
}
