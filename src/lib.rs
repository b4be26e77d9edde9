//! Automobile Sales Statistics Dashboard
//!
//! Loads the historical automobile sales dataset once, aggregates it per
//! report selection and renders the results as charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{DataLoader, DataSource, SalesRecord, SalesTable};
pub use stats::{compute_report, ReportMode, ReportOutput, Selection};
