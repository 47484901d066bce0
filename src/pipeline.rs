//! Analysis Pipeline
//! Runs load -> clean -> transform -> render, printing the console report
//! between stages. Each stage consumes the previous stage's value.

use crate::charts::{ChartRenderer, RenderError, RenderedChart};
use crate::config::AnalysisConfig;
use crate::data::schema::METRIC_COLUMNS;
use crate::data::{
    CleanError, CleaningStats, DataCleaner, DataLoader, DataOrigin, LoaderError,
};
use crate::gui::{show_charts, ViewerError};
use crate::report::{frame_info, missing_values, ConsoleReport};
use crate::stats::{
    CorrelationCalculator, CorrelationMatrix, DataTransformer, TransformError, Transformed,
};
use log::info;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Clean(#[from] CleanError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("Correlation failed: {0}")]
    Correlation(#[from] PolarsError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct AnalysisReport {
    pub origin: DataOrigin,
    pub cleaning: CleaningStats,
    pub transformed: Transformed,
    pub correlation: CorrelationMatrix,
    pub charts: Vec<RenderedChart>,
}

pub struct Pipeline {
    config: AnalysisConfig,
    report: ConsoleReport,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            report: ConsoleReport::new(true),
        }
    }

    /// Suppress the stdout report.
    pub fn quiet(mut self) -> Self {
        self.report = ConsoleReport::new(false);
        self
    }

    /// Run every stage in order; the first error stops the run.
    ///
    /// Charts rendered before a failure stay on disk and are still shown
    /// when the viewer is enabled.
    pub fn run(&self) -> Result<AnalysisReport, PipelineError> {
        let config = &self.config;
        let report = &self.report;

        // 1. Load
        let loaded = DataLoader::load(&config.source_path, &config.fallback)?;
        info!("Using {}", loaded.origin);
        report.head("Initial DataFrame Head:", &loaded.df);
        report.section("Initial DataFrame Info:", frame_info(&loaded.df));

        // 2. Clean
        let clean = DataCleaner::clean(loaded, &config.column_aliases)?;
        let column_names: Vec<String> = clean
            .df()
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        report.section("Standardized Column Names:", column_names.join(", "));
        report.section(
            "Missing Values Check:",
            missing_values(&clean.stats.missing_values),
        );
        report.line(format!(
            "Removed {} duplicate rows.",
            clean.stats.duplicates_removed
        ));
        let origin = clean.origin.clone();
        let cleaning = clean.stats.clone();

        // 3. Transform
        let transformed = DataTransformer::transform(clean, config)?;
        report.section(
            "DataFrame Info after Type Conversion:",
            frame_info(transformed.df()),
        );
        report.head("DataFrame Head with 'active' column:", transformed.df());
        report.section("Region Summary:", transformed.region_summary.frame());
        report.section(
            &format!("Top {} Regions by Total Confirmed:", config.top_n),
            transformed.top_regions.frame(),
        );

        // 4. Render
        let mut charts = Vec::with_capacity(4);
        let rendered = self.render_charts(&transformed, &mut charts);

        if !charts.is_empty() {
            report.section(
                "Charts written:",
                charts
                    .iter()
                    .map(|c| format!("  {}", c.path.display()))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        let shown = if config.show_charts && !charts.is_empty() {
            show_charts(charts.clone())
        } else {
            Ok(())
        };
        let correlation = rendered?;
        shown?;

        Ok(AnalysisReport {
            origin,
            cleaning,
            transformed,
            correlation,
            charts,
        })
    }

    /// Render the charts strictly in order, pushing each one as it is saved.
    ///
    /// Stops at the first failure; `charts` keeps what was drawn before it.
    pub fn render_charts(
        &self,
        transformed: &Transformed,
        charts: &mut Vec<RenderedChart>,
    ) -> Result<CorrelationMatrix, PipelineError> {
        let report = &self.report;
        let renderer = ChartRenderer::new(&self.config.output_dir)?;

        charts.push(renderer.render_top_regions(&transformed.top_regions.peaks()?)?);

        if let Some(trend) = &transformed.global_trend {
            report.head("Global Trend:", trend.frame());
        }
        charts.push(renderer.render_global_trend(transformed.global_trend.as_ref())?);

        let correlation = CorrelationCalculator::compute(transformed.df(), &METRIC_COLUMNS)?;
        report.section("Correlation Matrix:", correlation.to_frame()?);
        charts.push(renderer.render_correlation_heatmap(&correlation)?);

        if let Some(continents) = &transformed.continent_summary {
            report.section("Continent Summary:", continents.frame());
            charts.push(renderer.render_continent_share(&continents.peaks()?)?);
        } else {
            report.line(
                "Skipping Continent-Level Analysis: 'continent' column is missing or has insufficient unique values.",
            );
        }

        Ok(correlation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use crate::config::TrendMode;

    fn strict_pipeline(output_dir: &std::path::Path) -> Pipeline {
        Pipeline::new(AnalysisConfig {
            source_path: "/no/such/dir/covid_data.csv".into(),
            output_dir: output_dir.to_path_buf(),
            trend_mode: TrendMode::Strict,
            ..AnalysisConfig::default()
        })
        .quiet()
    }

    #[test]
    fn test_render_keeps_charts_drawn_before_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = strict_pipeline(dir.path());

        let config = &pipeline.config;
        let loaded = DataLoader::load(&config.source_path, &config.fallback).unwrap();
        let clean = DataCleaner::clean(loaded, &config.column_aliases).unwrap();
        let transformed = DataTransformer::transform(clean, config).unwrap();

        let mut charts = Vec::new();
        let err = pipeline.render_charts(&transformed, &mut charts).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Render(RenderError::UndefinedInput("global_trend"))
        ));
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind, ChartKind::TopRegions);
        assert!(charts[0].path.exists());
    }
}
