use covid_eda::config::{default_column_aliases, AnalysisConfig};
use covid_eda::data::{CleanError, DataCleaner, DataLoader, DataOrigin};
use covid_eda::stats::{DataTransformer, TransformError};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn config_for(path: &Path) -> AnalysisConfig {
    AnalysisConfig {
        source_path: path.to_path_buf(),
        ..AnalysisConfig::default()
    }
}

const HEADER: &str = "SNo,ObservationDate,Province/State,Country/Region,Confirmed,Deaths,Recovered,Tests";

#[test]
fn cleaned_table_has_no_nulls_or_duplicates() {
    let file = csv_file(&[
        HEADER,
        "1,01/22/2020,Hubei,China,444,17,28,1000",
        "1,01/22/2020,Hubei,China,444,17,28,1000",
        "2,01/22/2020,,Japan,2,0,0,50",
        "3,01/23/2020,Hubei,China,444,17,,1200",
        "4,01/23/2020,Ontario,Canada,,0,0,30",
        "5,01/23/2020,Ontario,Canada,1,0,0,30",
    ]);
    let config = config_for(file.path());

    let loaded = DataLoader::load(&config.source_path, &config.fallback).unwrap();
    assert!(matches!(loaded.origin, DataOrigin::File(_)));

    let clean = DataCleaner::clean(loaded, &config.column_aliases).unwrap();
    let df = clean.df();

    assert_eq!(clean.stats.rows_loaded, 6);
    // Japan (no province) and the Canada row without confirmed
    assert_eq!(clean.stats.null_rows_dropped, 2);
    assert_eq!(clean.stats.duplicates_removed, 1);
    assert_eq!(df.height(), 3);

    for column in df.get_columns() {
        assert_eq!(column.null_count(), 0);
    }
    let deduped = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .unwrap();
    assert_eq!(deduped.height(), df.height());

    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    assert!(names.contains(&"province_state".to_string()));
    assert!(names.contains(&"country".to_string()));
    assert!(names.contains(&"date".to_string()));
}

#[test]
fn unparseable_date_fails_transform() {
    let file = csv_file(&[
        HEADER,
        "1,01/22/2020,Hubei,China,444,17,28,1000",
        "2,sometime,Hubei,China,500,18,30,1100",
    ]);
    let config = config_for(file.path());

    let loaded = DataLoader::load(&config.source_path, &config.fallback).unwrap();
    let clean = DataCleaner::clean(loaded, &config.column_aliases).unwrap();
    let err = DataTransformer::transform(clean, &config).unwrap_err();

    assert!(matches!(err, TransformError::ParseFailure { row: 1, ref value } if value == "sometime"));
}

#[test]
fn missing_date_column_is_named() {
    let file = csv_file(&["Country/Region,Confirmed,Deaths,Recovered,Tests", "Chile,1,0,0,5"]);
    let loaded = DataLoader::load(file.path(), &[]).unwrap();

    let err = DataCleaner::clean(loaded, &default_column_aliases()).unwrap_err();
    assert!(matches!(err, CleanError::MissingColumn(ref c) if c == "date"));
}

#[test]
fn top_n_truncates_and_summary_bounds_hold() {
    let mut lines = vec!["country,date,confirmed,deaths,recovered,tests".to_string()];
    for i in 0..14 {
        // two observations per region, the later one is the peak
        lines.push(format!("R{i:02},2020-06-01,{},0,0,10", i * 10));
        lines.push(format!("R{i:02},2020-06-02,{},1,0,10", i * 10 + 5));
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let file = csv_file(&refs);
    let config = config_for(file.path());

    let loaded = DataLoader::load(&config.source_path, &config.fallback).unwrap();
    let clean = DataCleaner::clean(loaded, &config.column_aliases).unwrap();
    let transformed = DataTransformer::transform(clean, &config).unwrap();

    let regions = transformed.region_summary.peaks().unwrap();
    assert_eq!(regions.len(), 14);
    for peak in &regions {
        let i: i64 = peak.name[1..].parse().unwrap();
        assert_eq!(peak.total_confirmed, i * 10 + 5);
        assert_eq!(peak.total_deaths, 1);
    }

    let top = transformed.top_regions.peaks().unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].name, "R13");
    assert!(top
        .windows(2)
        .all(|w| w[0].total_confirmed >= w[1].total_confirmed));

    // no region is mapped to a continent
    assert!(transformed.continent_summary.is_none());
}

#[test]
fn single_continent_skips_summary() {
    let file = csv_file(&[
        "country,date,confirmed,deaths,recovered,tests",
        "USA,2020-03-01,10,1,1,100",
        "Mexico,2020-03-01,5,0,1,50",
    ]);
    let mut config = config_for(file.path());
    config.parent_regions.insert("Mexico".to_string(), "North America".to_string());

    let loaded = DataLoader::load(&config.source_path, &config.fallback).unwrap();
    let clean = DataCleaner::clean(loaded, &config.column_aliases).unwrap();
    let transformed = DataTransformer::transform(clean, &config).unwrap();

    assert!(transformed.continent_summary.is_none());
    let continents: HashSet<Option<String>> = transformed
        .records()
        .unwrap()
        .into_iter()
        .map(|r| r.continent)
        .collect();
    assert_eq!(continents, HashSet::from([Some("North America".to_string())]));
}
