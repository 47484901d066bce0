//! Analysis Configuration Module
//! Run settings, lookup tables and the embedded fallback dataset.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! reproduces the stock analysis exactly.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default input file looked up in the working directory.
pub const DEFAULT_SOURCE: &str = "covid_data.csv";

/// Default directory for rendered chart images.
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

/// Default number of regions in the top-N bar chart.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// How the global confirmed-cases time series is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMode {
    /// Sum `confirmed` across regions for each date.
    #[default]
    Aggregate,
    /// Leave the series undefined; the line chart then fails the run.
    Strict,
}

/// One hand-specified row of the fallback dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRow {
    pub country: String,
    pub date: String,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub tests: i64,
}

impl FallbackRow {
    fn new(
        country: &str,
        date: &str,
        confirmed: i64,
        deaths: i64,
        recovered: i64,
        tests: i64,
    ) -> Self {
        Self {
            country: country.to_string(),
            date: date.to_string(),
            confirmed,
            deaths,
            recovered,
            tests,
        }
    }
}

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Delimited input file
    pub source_path: PathBuf,

    /// Where chart PNGs are written
    pub output_dir: PathBuf,

    /// Regions kept in the top-N selection
    pub top_n: usize,

    pub trend_mode: TrendMode,

    /// Open the chart viewer window after rendering
    pub show_charts: bool,

    /// Normalized source column name -> canonical column name
    pub column_aliases: BTreeMap<String, String>,

    /// Region -> parent region (continent)
    pub parent_regions: BTreeMap<String, String>,

    /// Rows used when the input file cannot be read
    pub fallback: Vec<FallbackRow>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            top_n: DEFAULT_TOP_N,
            trend_mode: TrendMode::default(),
            show_charts: false,
            column_aliases: default_column_aliases(),
            parent_regions: default_parent_regions(),
            fallback: default_fallback_rows(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.fallback.is_empty() {
            return Err(ConfigError::ValidationError(
                "fallback dataset must contain at least one row".to_string(),
            ));
        }
        if let Some((alias, _)) = self
            .column_aliases
            .iter()
            .find(|(from, to)| from.is_empty() || to.is_empty())
        {
            return Err(ConfigError::ValidationError(format!(
                "empty column alias entry near '{}'",
                alias
            )));
        }
        Ok(())
    }
}

pub fn default_column_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("country_region".to_string(), "country".to_string()),
        ("observationdate".to_string(), "date".to_string()),
    ])
}

pub fn default_parent_regions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("USA".to_string(), "North America".to_string()),
        ("India".to_string(), "Asia".to_string()),
        ("Brazil".to_string(), "South America".to_string()),
    ])
}

/// Three regions observed on three dates.
pub fn default_fallback_rows() -> Vec<FallbackRow> {
    vec![
        FallbackRow::new("USA", "2020-03-01", 1000, 10, 100, 10000),
        FallbackRow::new("India", "2020-03-01", 10, 0, 5, 500),
        FallbackRow::new("Brazil", "2020-03-01", 50, 1, 10, 2000),
        FallbackRow::new("USA", "2020-03-31", 10000, 150, 5000, 100000),
        FallbackRow::new("India", "2020-03-31", 500, 5, 100, 15000),
        FallbackRow::new("Brazil", "2020-03-31", 2000, 50, 500, 50000),
        FallbackRow::new("USA", "2021-01-01", 25000, 500, 10000, 500000),
        FallbackRow::new("India", "2021-01-01", 15000, 250, 8000, 300000),
        FallbackRow::new("Brazil", "2021-01-01", 18000, 300, 7000, 450000),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fallback.len(), 9);
        assert_eq!(config.parent_regions.len(), 3);
        assert_eq!(config.trend_mode, TrendMode::Aggregate);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_n": 3, "trend_mode": "strict"}}"#).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.trend_mode, TrendMode::Strict);
        assert_eq!(config.source_path, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(config.fallback, default_fallback_rows());
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"top_n": 0}}"#).unwrap();

        let err = AnalysisConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/covid_eda.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
