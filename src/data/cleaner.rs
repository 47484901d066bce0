//! Data Cleaner Module
//! Standardizes column names, enforces the canonical schema, handles nulls
//! and removes duplicate rows.

use crate::data::loader::{DataOrigin, LoadedTable};
use crate::data::schema::{
    normalize_column_name, COUNTRY, COUNT_COLUMNS, RECOVERED, REQUIRED_COLUMNS,
};
use log::{debug, info};
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Missing required column '{0}' after name normalization")]
    MissingColumn(String),
    #[error("Column '{column}' cannot be read as integer counts: {reason}")]
    InvalidColumnType { column: String, reason: String },
}

/// Row accounting for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningStats {
    pub rows_loaded: usize,
    /// Null count per column, taken before `recovered` is filled.
    pub missing_values: Vec<(String, usize)>,
    pub null_rows_dropped: usize,
    pub duplicates_removed: usize,
    pub rows_remaining: usize,
}

/// Table with the canonical schema, no nulls and no duplicate rows.
#[derive(Debug, Clone)]
pub struct CleanTable {
    df: DataFrame,
    pub origin: DataOrigin,
    pub stats: CleaningStats,
}

impl CleanTable {
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_frame(self) -> DataFrame {
        self.df
    }
}

/// Cleans a freshly loaded table.
pub struct DataCleaner;

impl DataCleaner {
    /// Run every cleaning step and return the validated table.
    pub fn clean(
        loaded: LoadedTable,
        aliases: &BTreeMap<String, String>,
    ) -> Result<CleanTable, CleanError> {
        let LoadedTable { df, origin } = loaded;
        let rows_loaded = df.height();

        let df = Self::standardize_columns(df, aliases)?;
        let df = Self::ensure_schema(df)?;
        let missing_values = Self::missing_values(&df);

        let df = df
            .lazy()
            .with_column(col(RECOVERED).fill_null(lit(0)))
            .drop_nulls(None)
            .collect()?;
        let null_rows_dropped = rows_loaded - df.height();
        debug!("Dropped {} rows containing nulls", null_rows_dropped);

        let before_dedup = df.height();
        let df = df
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        let duplicates_removed = before_dedup - df.height();
        info!("Removed {} duplicate rows.", duplicates_removed);

        let df = Self::coerce_types(df)?;

        let stats = CleaningStats {
            rows_loaded,
            missing_values,
            null_rows_dropped,
            duplicates_removed,
            rows_remaining: df.height(),
        };

        Ok(CleanTable { df, origin, stats })
    }

    /// Normalize every header, then apply the alias table.
    pub fn standardize_columns(
        mut df: DataFrame,
        aliases: &BTreeMap<String, String>,
    ) -> Result<DataFrame, CleanError> {
        let current: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in current {
            let normalized = normalize_column_name(&name);
            let target = aliases.get(&normalized).cloned().unwrap_or(normalized);
            if target != name {
                df.rename(&name, target.as_str().into())?;
            }
        }

        // Rebuild so the cached schema picks up the new names.
        Ok(DataFrame::new(df.take_columns())?)
    }

    /// Check required columns; add an all-null `recovered` when absent.
    fn ensure_schema(mut df: DataFrame) -> Result<DataFrame, CleanError> {
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| df.column(name).is_err())
        {
            return Err(CleanError::MissingColumn(missing.to_string()));
        }

        if df.column(RECOVERED).is_err() {
            debug!("No '{}' column in source, treating all values as missing", RECOVERED);
            let height = df.height();
            df.with_column(Series::full_null(RECOVERED.into(), height, &DataType::Int64))?;
        }

        Ok(df)
    }

    fn missing_values(df: &DataFrame) -> Vec<(String, usize)> {
        df.get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect()
    }

    /// Counts become `Int64`, the region key becomes text.
    fn coerce_types(mut df: DataFrame) -> Result<DataFrame, CleanError> {
        for name in COUNT_COLUMNS {
            let casted = df
                .column(name)?
                .strict_cast(&DataType::Int64)
                .map_err(|e| CleanError::InvalidColumnType {
                    column: name.to_string(),
                    reason: e.to_string(),
                })?;
            df.with_column(casted)?;
        }

        let country = df.column(COUNTRY)?.cast(&DataType::String)?;
        df.with_column(country)?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_column_aliases, default_fallback_rows};
    use crate::data::loader::DataLoader;

    fn loaded(df: DataFrame) -> LoadedTable {
        LoadedTable {
            df,
            origin: DataOrigin::Fallback,
        }
    }

    fn raw_frame() -> DataFrame {
        df!(
            "Country/Region" => ["USA", "USA", "India", "Brazil", "Brazil"],
            "ObservationDate" => [Some("2020-03-01"), Some("2020-03-01"), Some("2020-03-01"), None, Some("2020-03-02")],
            "Confirmed" => [Some(10i64), Some(10), Some(5), Some(7), Some(9)],
            "Deaths" => [1i64, 1, 0, 0, 1],
            "Recovered" => [None, None, Some(2i64), Some(1), Some(3)],
            "Tests" => [100i64, 100, 50, 70, 90]
        )
        .unwrap()
    }

    #[test]
    fn test_standardize_columns() {
        let df = DataCleaner::standardize_columns(raw_frame(), &default_column_aliases()).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["country", "date", "confirmed", "deaths", "recovered", "tests"]
        );
    }

    #[test]
    fn test_renamed_columns_resolve_in_lazy_plan() {
        let df = DataCleaner::standardize_columns(raw_frame(), &default_column_aliases()).unwrap();
        let out = df
            .lazy()
            .select([col(COUNTRY), col(RECOVERED).fill_null(lit(0))])
            .collect()
            .unwrap();
        assert_eq!(out.height(), 5);
        assert_eq!(out.column(RECOVERED).unwrap().null_count(), 0);
    }

    #[test]
    fn test_clean_fills_drops_and_dedups() {
        let clean = DataCleaner::clean(loaded(raw_frame()), &default_column_aliases()).unwrap();
        let df = clean.df();

        // one null date row dropped, one USA duplicate collapsed
        assert_eq!(clean.stats.rows_loaded, 5);
        assert_eq!(clean.stats.null_rows_dropped, 1);
        assert_eq!(clean.stats.duplicates_removed, 1);
        assert_eq!(df.height(), 3);

        for column in df.get_columns() {
            assert_eq!(column.null_count(), 0, "nulls left in {}", column.name());
        }
        let recovered: Vec<Option<i64>> = df
            .column(RECOVERED)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(recovered, vec![Some(0), Some(2), Some(3)]);

        let missing: BTreeMap<String, usize> = clean.stats.missing_values.into_iter().collect();
        assert_eq!(missing["recovered"], 2);
        assert_eq!(missing["date"], 1);
    }

    #[test]
    fn test_clean_keeps_first_occurrence_order() {
        let clean = DataCleaner::clean(loaded(raw_frame()), &default_column_aliases()).unwrap();
        let countries: Vec<Option<&str>> = clean
            .df()
            .column(COUNTRY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(countries, vec![Some("USA"), Some("India"), Some("Brazil")]);
    }

    #[test]
    fn test_missing_required_column() {
        let df = raw_frame().drop("Tests").unwrap();
        let err = DataCleaner::clean(loaded(df), &default_column_aliases()).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn(ref c) if c == "tests"));
    }

    #[test]
    fn test_missing_recovered_column_becomes_zero() {
        let df = raw_frame().drop("Recovered").unwrap();
        let clean = DataCleaner::clean(loaded(df), &default_column_aliases()).unwrap();
        let recovered = clean.df().column(RECOVERED).unwrap().i64().unwrap();
        assert!(recovered.into_iter().all(|v| v == Some(0)));
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        let df = df!(
            "country" => ["USA"],
            "date" => ["2020-03-01"],
            "confirmed" => ["lots"],
            "deaths" => [1i64],
            "recovered" => [0i64],
            "tests" => [10i64]
        )
        .unwrap();
        let err = DataCleaner::clean(loaded(df), &default_column_aliases()).unwrap_err();
        assert!(matches!(err, CleanError::InvalidColumnType { ref column, .. } if column == "confirmed"));
    }

    #[test]
    fn test_fallback_survives_cleaning_intact() {
        let df = DataLoader::fallback_frame(&default_fallback_rows()).unwrap();
        let clean = DataCleaner::clean(loaded(df), &default_column_aliases()).unwrap();
        assert_eq!(clean.stats.rows_remaining, 9);
        assert_eq!(clean.stats.duplicates_removed, 0);
    }
}
