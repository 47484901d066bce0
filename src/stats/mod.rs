//! Stats module - transforms, grouped summaries and correlation

mod correlation;
mod transformer;

pub use correlation::{CorrelationCalculator, CorrelationMatrix};
pub use transformer::{
    parse_observation_date, CaseRecord, DataTransformer, GroupPeak, GroupSummary,
    TransformError, Transformed, TrendSeries,
};
