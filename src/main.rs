//! COVID-19 EDA - Case Data Analysis & Chart Renderer
//!
//! Command-line entry point for the analysis pipeline.

use anyhow::Context;
use clap::Parser;
use covid_eda::cli::Cli;
use covid_eda::Pipeline;
use log::info;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli
        .resolve_config()
        .context("Failed to load configuration")?;

    let report = Pipeline::new(config)
        .run()
        .context("Analysis run stopped")?;

    info!(
        "Analysis complete: {} rows analysed, {} charts written",
        report.cleaning.rows_remaining,
        report.charts.len()
    );
    Ok(())
}
