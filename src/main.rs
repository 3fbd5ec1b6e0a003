//! CLI entry point for the borough rater.
//!
//! Provides subcommands for listing observation dates, querying a region or
//! a period, computing period statistics and severity tiers, recording a
//! manual entry, and exporting filtered records.

use anyhow::{Result, bail};
use borough_rater::config::Config;
use borough_rater::engine::Engine;
use borough_rater::output::{
    export_records, format_severity, format_summary, print_json, write_records,
};
use borough_rater::query::sort_by_column;
use borough_rater::record::Column;
use borough_rater::store::RecordStore;
use borough_rater::source::FileSource;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "borough_rater")]
#[command(about = "Query and aggregate regional mobility and case data", long_about = None)]
struct Cli {
    /// TOML config file (data path and region list)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data table to use, overriding the config and DATA_PATH
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every distinct observation date
    Dates,
    /// Show one region's records over a date range
    Region {
        /// Region name, e.g. "Camden"
        region: String,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Column to sort by (date, parks, new-cases, ...)
        #[arg(long)]
        sort_by: Option<Column>,
    },
    /// Compute the headline statistics for a date range
    Stats {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Classify every region by deaths over a date range
    Map {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Record new cases and deaths for a region and save the table
    Add {
        region: String,

        new_cases: String,

        new_deaths: String,

        /// Entry date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Write the records of a date range to a CSV file
    Export {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Restrict to one region
        #[arg(long)]
        region: Option<String>,

        /// CSV file to write
        #[arg(short, long, default_value = "export.csv")]
        output: String,
    },
    /// Load the table strictly and report problems
    Check,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/borough_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("borough_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!(data_path = %config.data_path.display(), regions = config.regions.names.len(), "Configuration loaded");

    match cli.command {
        Commands::Dates => {
            let engine = Engine::open(&config)?;
            for date in engine.dates().dates() {
                println!("{date}");
            }
        }
        Commands::Region {
            region,
            from,
            to,
            sort_by,
        } => {
            let engine = Engine::open(&config)?;
            let mut records = engine.region_data(&region, &from, &to)?;
            if let Some(column) = sort_by {
                sort_by_column(&mut records, column);
            }
            info!(region = %region, records = records.len(), "Region query");
            write_records(std::io::stdout().lock(), &records)?;
        }
        Commands::Stats { from, to, json } => {
            let engine = Engine::open(&config)?;
            let summary = engine.period_summary(&from, &to)?;
            if json {
                print_json(&summary)?;
            } else {
                println!("{}", format_summary(&summary));
            }
        }
        Commands::Map { from, to, json } => {
            let engine = Engine::open(&config)?;
            let map = engine.severity_map(&from, &to)?;
            if json {
                print_json(&map)?;
            } else {
                print!("{}", format_severity(&map));
            }
        }
        Commands::Add {
            region,
            new_cases,
            new_deaths,
            date,
        } => {
            if new_cases.trim().is_empty() || new_deaths.trim().is_empty() {
                bail!("enter data for all the fields");
            }
            let mut engine = Engine::open(&config)?;
            match engine.add_entry(date.as_deref(), &region, &new_cases, &new_deaths) {
                Ok(row) => info!(row = %row.join(","), "Data added"),
                Err(e) => {
                    error!(error = %e, "Entry not saved");
                    return Err(e.into());
                }
            }
        }
        Commands::Export {
            from,
            to,
            region,
            output,
        } => {
            let engine = Engine::open(&config)?;
            let records = match region {
                Some(region) => engine.region_data(&region, &from, &to)?,
                None => engine.period_data(&from, &to)?,
            };
            export_records(&output, &records)?;
        }
        Commands::Check => {
            let store = RecordStore::new(FileSource::new(&config.data_path));
            let records = store.try_load()?;
            let unknown: Vec<_> = records
                .iter()
                .filter(|r| !config.regions.contains(&r.region))
                .map(|r| r.region.as_str())
                .collect();
            info!(records = records.len(), unknown_regions = unknown.len(), "Table is well formed");
            if let Some(first) = unknown.first() {
                info!(region = %first, "First row with a region outside the configured list");
            }
        }
    }

    Ok(())
}

/// Config file (or defaults), then `DATA_PATH`, then `--data`.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Ok(path) = std::env::var("DATA_PATH") {
        config.data_path = PathBuf::from(path);
    }
    if let Some(path) = &cli.data {
        config.data_path = path.clone();
    }
    config.validate()?;
    Ok(config)
}
