//! COVID-19 EDA - Case Data Analysis & Chart Renderer
//!
//! Loads a case dataset (or the embedded sample), cleans it, derives peak
//! summaries and correlations, and renders the analysis charts.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod gui;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::{AnalysisConfig, TrendMode};
pub use pipeline::{AnalysisReport, Pipeline, PipelineError};
