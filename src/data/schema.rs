//! Canonical column names shared by every stage after cleaning.

pub const COUNTRY: &str = "country";
pub const DATE: &str = "date";
pub const CONFIRMED: &str = "confirmed";
pub const DEATHS: &str = "deaths";
pub const RECOVERED: &str = "recovered";
pub const TESTS: &str = "tests";
pub const ACTIVE: &str = "active";
pub const CONTINENT: &str = "continent";

pub const TOTAL_CONFIRMED: &str = "total_confirmed";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const TOTAL_RECOVERED: &str = "total_recovered";

/// Columns that must exist once source names are normalized.
pub const REQUIRED_COLUMNS: [&str; 5] = [COUNTRY, DATE, CONFIRMED, DEATHS, TESTS];

/// Integer count columns coerced to `Int64` by the cleaner.
pub const COUNT_COLUMNS: [&str; 4] = [CONFIRMED, DEATHS, RECOVERED, TESTS];

/// Metrics entering the correlation matrix, in display order.
pub const METRIC_COLUMNS: [&str; 5] = [CONFIRMED, DEATHS, RECOVERED, ACTIVE, TESTS];

/// Lowercase a source header and replace spaces and slashes with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect()
}
