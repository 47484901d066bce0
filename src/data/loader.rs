//! CSV Data Loader Module
//! Handles CSV file loading with Polars and the embedded fallback dataset.

use crate::config::FallbackRow;
use log::{info, warn};
use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Source header names used by the fallback dataset.
pub const FALLBACK_COLUMNS: [&str; 6] = [
    "Country/Region",
    "ObservationDate",
    "Confirmed",
    "Deaths",
    "Recovered",
    "Tests",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("Failed to build fallback dataset: {0}")]
    Fallback(#[from] PolarsError),
}

/// Where the loaded rows came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    File(PathBuf),
    Fallback,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Fallback => write!(f, "embedded fallback dataset"),
        }
    }
}

/// Raw table as read, before any cleaning.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub df: DataFrame,
    pub origin: DataOrigin,
}

/// Reads the input dataset, substituting the fallback rows when it is unavailable.
pub struct DataLoader;

impl DataLoader {
    /// Load `source`, or build the fallback table if it cannot be read.
    ///
    /// Only the fallback construction itself can fail here.
    pub fn load(source: &Path, fallback: &[FallbackRow]) -> Result<LoadedTable, LoaderError> {
        match Self::load_csv(source) {
            Ok(df) => {
                info!("Dataset loaded successfully.");
                Ok(LoadedTable {
                    df,
                    origin: DataOrigin::File(source.to_path_buf()),
                })
            }
            Err(err) => {
                warn!("{}", err);
                warn!(
                    "Simulating dataset as '{}' was not found.",
                    source.display()
                );
                Ok(LoadedTable {
                    df: Self::fallback_frame(fallback)?,
                    origin: DataOrigin::Fallback,
                })
            }
        }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let unavailable = |reason: String| LoaderError::SourceUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(unavailable("no such file".to_string()));
        }

        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| unavailable(e.to_string()))
    }

    /// Build the fallback table with the raw dataset headers.
    pub fn fallback_frame(rows: &[FallbackRow]) -> Result<DataFrame, LoaderError> {
        let [country, date, confirmed, deaths, recovered, tests] = FALLBACK_COLUMNS;

        let df = df!(
            country => rows.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
            date => rows.iter().map(|r| r.date.as_str()).collect::<Vec<_>>(),
            confirmed => rows.iter().map(|r| r.confirmed).collect::<Vec<i64>>(),
            deaths => rows.iter().map(|r| r.deaths).collect::<Vec<i64>>(),
            recovered => rows.iter().map(|r| r.recovered).collect::<Vec<i64>>(),
            tests => rows.iter().map(|r| r.tests).collect::<Vec<i64>>()
        )?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_fallback_rows;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_fallback() {
        let loaded = DataLoader::load(
            Path::new("/definitely/not/here/covid_data.csv"),
            &default_fallback_rows(),
        )
        .unwrap();

        assert_eq!(loaded.origin, DataOrigin::Fallback);
        assert_eq!(loaded.df.height(), 9);
        let names: Vec<String> = loaded
            .df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, FALLBACK_COLUMNS.map(String::from).to_vec());
    }

    #[test]
    fn test_reads_csv_verbatim() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Country/Region,ObservationDate,Confirmed,Deaths,Recovered,Tests").unwrap();
        writeln!(file, "Italy,2020-04-01,100,3,,900").unwrap();
        writeln!(file, "Spain,2020-04-01,80,2,10,700").unwrap();

        let loaded = DataLoader::load(file.path(), &default_fallback_rows()).unwrap();

        assert_eq!(loaded.origin, DataOrigin::File(file.path().to_path_buf()));
        assert_eq!(loaded.df.height(), 2);
        assert_eq!(loaded.df.column("Recovered").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_csv_reports_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::load_csv(dir.path()).unwrap_err();
        assert!(matches!(err, LoaderError::SourceUnavailable { .. }));
    }
}
