//! Console Report Module
//! Human-readable summary sections printed to stdout as the pipeline runs.

use polars::prelude::*;
use std::fmt::{Display, Write};

/// Rows shown for table previews.
pub const PREVIEW_ROWS: usize = 5;

/// Prints report sections; a disabled report prints nothing.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReport {
    enabled: bool,
}

impl ConsoleReport {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Blank line, title, then the body.
    pub fn section(&self, title: &str, body: impl Display) {
        if self.enabled {
            println!("\n{}\n{}", title, body);
        }
    }

    pub fn line(&self, text: impl Display) {
        if self.enabled {
            println!("\n{}", text);
        }
    }

    pub fn head(&self, title: &str, df: &DataFrame) {
        if self.enabled {
            self.section(title, df.head(Some(PREVIEW_ROWS)));
        }
    }
}

/// Shape plus one `name  non-null  dtype` line per column.
pub fn frame_info(df: &DataFrame) -> String {
    let mut out = format!(
        "{} entries, {} columns\n",
        df.height(),
        df.width()
    );
    let width = df
        .get_columns()
        .iter()
        .map(|c| c.name().len())
        .max()
        .unwrap_or(0);

    for (idx, column) in df.get_columns().iter().enumerate() {
        let non_null = column.len() - column.null_count();
        let _ = writeln!(
            out,
            " {:>2}  {:<width$}  {} non-null  {}",
            idx,
            column.name().as_str(),
            non_null,
            column.dtype(),
            width = width
        );
    }
    out
}

/// `name  count` lines, one per column.
pub fn missing_values(counts: &[(String, usize)]) -> String {
    let width = counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    counts
        .iter()
        .map(|(name, count)| format!("{:<width$}  {}", name, count, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
