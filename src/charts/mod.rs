//! Charts module - Chart rendering

mod renderer;
pub mod style;

pub use renderer::{ChartKind, ChartRenderer, RenderError, RenderedChart};
