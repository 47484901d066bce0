//! GUI module - Chart viewer window

mod app;
mod chart_viewer;

pub use app::{show_charts, ChartWindowApp, ViewerError};
pub use chart_viewer::{ChartPage, ChartViewer};
