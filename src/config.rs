//! Engine configuration: where the table lives and which regions exist.
//!
//! Loaded from an optional TOML file. Missing sections fall back to the
//! London deployment:
//!
//! ```toml
//! data_path = "covid_london.csv"
//!
//! [regions]
//! region_count = 33
//! names = ["Barking And Dagenham", "Barnet", "..."]
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The 33 London boroughs of the reference dataset.
pub const LONDON_BOROUGHS: [&str; 33] = [
    "Barking And Dagenham",
    "Barnet",
    "Bexley",
    "Brent",
    "Bromley",
    "Camden",
    "City Of London",
    "Westminster",
    "Croydon",
    "Ealing",
    "Enfield",
    "Greenwich",
    "Hackney",
    "Hammersmith And Fulham",
    "Haringey",
    "Harrow",
    "Havering",
    "Hillingdon",
    "Hounslow",
    "Islington",
    "Kensington And Chelsea",
    "Kingston Upon Thames",
    "Lambeth",
    "Lewisham",
    "Merton",
    "Newham",
    "Redbridge",
    "Richmond Upon Thames",
    "Southwark",
    "Sutton",
    "Tower Hamlets",
    "Waltham Forest",
    "Wandsworth",
];

pub const DEFAULT_DATA_PATH: &str = "covid_london.csv";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    pub regions: RegionConfig,
}

/// The fixed set of administrative regions.
///
/// `region_count` is the denominator of the severity expected share. It is
/// configured separately from `names` and is not derived from the data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub names: Vec<String>,
    pub region_count: usize,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data_path",
                reason: "cannot be empty".into(),
            });
        }
        self.regions.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            regions: RegionConfig::default(),
        }
    }
}

impl RegionConfig {
    pub fn contains(&self, region: &str) -> bool {
        self.names.iter().any(|n| n == region)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "regions.region_count",
                reason: "must be greater than zero".into(),
            });
        }
        if self.names.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "regions.names",
                reason: "at least one region is required".into(),
            });
        }
        Ok(())
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            names: LONDON_BOROUGHS.iter().map(|s| s.to_string()).collect(),
            region_count: LONDON_BOROUGHS.len(),
        }
    }
}
