//! Data Transformer Module
//! Date coercion, derived columns and the grouped peak summaries.

use crate::config::{AnalysisConfig, TrendMode};
use crate::data::schema::{
    ACTIVE, CONFIRMED, CONTINENT, COUNTRY, DATE, DEATHS, RECOVERED, TESTS, TOTAL_CONFIRMED,
    TOTAL_DEATHS, TOTAL_RECOVERED,
};
use crate::data::CleanTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m/%d/%y"];

/// Storage unit of the parsed `date` column.
pub const DATE_UNIT: TimeUnit = TimeUnit::Milliseconds;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Cannot parse date '{value}' in row {row}")]
    ParseFailure { row: usize, value: String },
    #[error("Column '{column}' has unsupported type {dtype} for date conversion")]
    UnsupportedDateType { column: String, dtype: String },
    #[error("Timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// Parse a date cell, accepting common ISO and US layouts with or without a time.
pub fn parse_observation_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn millis_to_datetime(ms: i64) -> Result<NaiveDateTime, TransformError> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or(TransformError::TimestampOutOfRange(ms))
}

/// One row of the transformed table.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub country: String,
    pub date: NaiveDateTime,
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub tests: i64,
    pub active: i64,
    pub continent: Option<String>,
}

/// Peak values of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPeak {
    pub name: String,
    pub total_confirmed: i64,
    pub total_deaths: i64,
    pub total_recovered: i64,
}

/// Per-group maxima of confirmed, deaths and recovered.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    key: &'static str,
    frame: DataFrame,
}

impl GroupSummary {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Rows in frame order.
    pub fn peaks(&self) -> Result<Vec<GroupPeak>, TransformError> {
        let names = self.frame.column(self.key)?.str()?;
        let confirmed = self.frame.column(TOTAL_CONFIRMED)?.i64()?;
        let deaths = self.frame.column(TOTAL_DEATHS)?.i64()?;
        let recovered = self.frame.column(TOTAL_RECOVERED)?.i64()?;

        Ok((0..self.frame.height())
            .map(|i| GroupPeak {
                name: names.get(i).unwrap_or_default().to_string(),
                total_confirmed: confirmed.get(i).unwrap_or_default(),
                total_deaths: deaths.get(i).unwrap_or_default(),
                total_recovered: recovered.get(i).unwrap_or_default(),
            })
            .collect())
    }
}

/// Confirmed cases summed across regions per date, in date order.
#[derive(Debug, Clone)]
pub struct TrendSeries {
    frame: DataFrame,
}

impl TrendSeries {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn points(&self) -> Result<Vec<(NaiveDateTime, i64)>, TransformError> {
        let dates = self.frame.column(DATE)?.cast(&DataType::Int64)?;
        let dates = dates.i64()?;
        let confirmed = self.frame.column(CONFIRMED)?.i64()?;

        dates
            .into_iter()
            .zip(confirmed.into_iter())
            .filter_map(|(d, c)| Some((d?, c.unwrap_or_default())))
            .map(|(d, c)| Ok((millis_to_datetime(d)?, c)))
            .collect()
    }
}

/// Output of the transform stage.
#[derive(Debug, Clone)]
pub struct Transformed {
    df: DataFrame,
    pub region_summary: GroupSummary,
    pub top_regions: GroupSummary,
    /// `None` when the trend is left undefined (`TrendMode::Strict`).
    pub global_trend: Option<TrendSeries>,
    /// `None` when fewer than two distinct continents were mapped.
    pub continent_summary: Option<GroupSummary>,
}

impl Transformed {
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    /// Typed view of every row.
    pub fn records(&self) -> Result<Vec<CaseRecord>, TransformError> {
        let df = &self.df;
        let country = df.column(COUNTRY)?.str()?;
        let dates = df.column(DATE)?.cast(&DataType::Int64)?;
        let dates = dates.i64()?;
        let confirmed = df.column(CONFIRMED)?.i64()?;
        let deaths = df.column(DEATHS)?.i64()?;
        let recovered = df.column(RECOVERED)?.i64()?;
        let tests = df.column(TESTS)?.i64()?;
        let active = df.column(ACTIVE)?.i64()?;
        let continent = df.column(CONTINENT)?.str()?;

        (0..df.height())
            .map(|i| {
                Ok(CaseRecord {
                    country: country.get(i).unwrap_or_default().to_string(),
                    date: millis_to_datetime(dates.get(i).unwrap_or_default())?,
                    confirmed: confirmed.get(i).unwrap_or_default(),
                    deaths: deaths.get(i).unwrap_or_default(),
                    recovered: recovered.get(i).unwrap_or_default(),
                    tests: tests.get(i).unwrap_or_default(),
                    active: active.get(i).unwrap_or_default(),
                    continent: continent.get(i).map(str::to_string),
                })
            })
            .collect()
    }
}

/// Derives columns and summaries from a cleaned table.
pub struct DataTransformer;

impl DataTransformer {
    pub fn transform(
        clean: CleanTable,
        config: &AnalysisConfig,
    ) -> Result<Transformed, TransformError> {
        let df = Self::coerce_dates(clean.into_frame())?;
        let df = Self::add_active(df)?;
        let df = Self::map_parent_regions(df, &config.parent_regions)?;

        let region_summary = GroupSummary {
            key: COUNTRY,
            frame: Self::peak_summary(&df, COUNTRY)?,
        };
        let top_regions = GroupSummary {
            key: COUNTRY,
            frame: Self::top_n(region_summary.frame(), config.top_n)?,
        };
        debug!(
            "{} regions summarized, {} kept for the top list",
            region_summary.len(),
            top_regions.len()
        );

        let global_trend = match config.trend_mode {
            TrendMode::Aggregate => Some(TrendSeries {
                frame: Self::global_trend(&df)?,
            }),
            TrendMode::Strict => {
                debug!("Global trend left undefined (strict mode)");
                None
            }
        };

        let continent_summary = if Self::distinct_continents(&df)? > 1 {
            Some(GroupSummary {
                key: CONTINENT,
                frame: Self::continent_summary(&df)?,
            })
        } else {
            info!("Fewer than two continents mapped, continent summary skipped");
            None
        };

        Ok(Transformed {
            df,
            region_summary,
            top_regions,
            global_trend,
            continent_summary,
        })
    }

    /// Replace the `date` column with `Datetime(ms)` values.
    ///
    /// The first unparseable cell fails the whole table.
    pub fn coerce_dates(mut df: DataFrame) -> Result<DataFrame, TransformError> {
        let column = df.column(DATE)?;
        let datetime = DataType::Datetime(DATE_UNIT, None);

        let millis: Vec<i64> = match column.dtype() {
            DataType::String => column
                .str()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let raw = value.unwrap_or_default();
                    parse_observation_date(raw)
                        .map(|dt| dt.and_utc().timestamp_millis())
                        .ok_or_else(|| TransformError::ParseFailure {
                            row,
                            value: raw.to_string(),
                        })
                })
                .collect::<Result<_, _>>()?,
            DataType::Date | DataType::Datetime(_, _) => {
                let as_int = column.cast(&datetime)?.cast(&DataType::Int64)?;
                as_int.i64()?.into_iter().flatten().collect()
            }
            other => {
                return Err(TransformError::UnsupportedDateType {
                    column: DATE.to_string(),
                    dtype: other.to_string(),
                })
            }
        };

        let dates = Series::new(DATE.into(), millis).cast(&datetime)?;
        df.with_column(dates)?;
        Ok(df)
    }

    /// `active = confirmed - deaths - recovered`, unclamped.
    pub fn add_active(df: DataFrame) -> Result<DataFrame, TransformError> {
        Ok(df
            .lazy()
            .with_column((col(CONFIRMED) - col(DEATHS) - col(RECOVERED)).alias(ACTIVE))
            .collect()?)
    }

    /// Look up each region's continent; unmapped regions get null.
    pub fn map_parent_regions(
        mut df: DataFrame,
        mapping: &BTreeMap<String, String>,
    ) -> Result<DataFrame, TransformError> {
        let continents: Vec<Option<&str>> = df
            .column(COUNTRY)?
            .str()?
            .into_iter()
            .map(|country| country.and_then(|c| mapping.get(c)).map(String::as_str))
            .collect();

        df.with_column(Series::new(CONTINENT.into(), continents))?;
        Ok(df)
    }

    /// Max of confirmed/deaths/recovered per `key`, groups in first-seen order.
    pub fn peak_summary(df: &DataFrame, key: &str) -> Result<DataFrame, TransformError> {
        Ok(df
            .clone()
            .lazy()
            .filter(col(key).is_not_null())
            .group_by_stable([col(key)])
            .agg([
                col(CONFIRMED).max().alias(TOTAL_CONFIRMED),
                col(DEATHS).max().alias(TOTAL_DEATHS),
                col(RECOVERED).max().alias(TOTAL_RECOVERED),
            ])
            .collect()?)
    }

    /// Continent peaks ordered by continent name.
    pub fn continent_summary(df: &DataFrame) -> Result<DataFrame, TransformError> {
        Ok(Self::peak_summary(df, CONTINENT)?
            .lazy()
            .sort([CONTINENT], SortMultipleOptions::default())
            .collect()?)
    }

    /// Stable descending sort on `total_confirmed`, first `n` rows.
    pub fn top_n(summary: &DataFrame, n: usize) -> Result<DataFrame, TransformError> {
        Ok(summary
            .clone()
            .lazy()
            .sort(
                [TOTAL_CONFIRMED],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .limit(n as IdxSize)
            .collect()?)
    }

    pub fn global_trend(df: &DataFrame) -> Result<DataFrame, TransformError> {
        Ok(df
            .clone()
            .lazy()
            .group_by([col(DATE)])
            .agg([col(CONFIRMED).sum()])
            .sort([DATE], SortMultipleOptions::default())
            .collect()?)
    }

    fn distinct_continents(df: &DataFrame) -> Result<usize, TransformError> {
        let continents = df.column(CONTINENT)?.str()?;
        Ok(continents.into_iter().flatten().collect::<HashSet<_>>().len())
    }
}
