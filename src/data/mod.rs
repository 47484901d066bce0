//! Data module - CSV loading, schema and cleaning

mod cleaner;
mod loader;
pub mod schema;

pub use cleaner::{CleanError, CleanTable, CleaningStats, DataCleaner};
pub use loader::{DataLoader, DataOrigin, LoadedTable, LoaderError, FALLBACK_COLUMNS};
