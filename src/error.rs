//! Error taxonomy for the engine.
//!
//! Storage failures degrade loads to an empty table, format failures abort
//! them, and range errors are raised only at the [`crate::engine::Engine`]
//! boundary.

use std::path::PathBuf;
use thiserror::Error;

/// A row or caller-supplied value that could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: field '{column}' is not a number: '{value}'")]
    NotANumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("'{value}' is not a count")]
    InvalidCount { value: String },

    #[error("adding '{value}' overflows {column}")]
    CountOverflow { column: &'static str, value: String },

    #[error("'{value}' is not a yyyy-MM-dd date")]
    InvalidDate { value: String },

    #[error("malformed table: {0}")]
    Csv(String),
}

/// Problems with the engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("storage error on {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("unknown region: {0}")]
    UnknownRegion(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Splits a `csv` error into a storage or a format failure.
    pub fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => EngineError::storage(path, io),
                other => FormatError::Csv(format!("{other:?}")).into(),
            }
        } else {
            FormatError::Csv(err.to_string()).into()
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
