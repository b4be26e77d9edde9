//! Data module - dataset loading and the typed sales table

mod loader;
mod table;

pub use loader::{DataLoader, DataSource, LoaderError, DEFAULT_DATA_URL, REQUIRED_COLUMNS};
pub use table::{Month, SalesRecord, SalesTable, UnknownMonth};
