//! Dashboard Configuration
//! Optional JSON settings file; every field falls back to a default.

use crate::data::DEFAULT_DATA_URL;
use crate::stats::{ReportMode, MAX_YEAR, MIN_YEAR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Looked up in the working directory when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "autosales_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Local CSV path or http(s) URL.
    pub data_source: String,
    pub default_mode: ReportMode,
    pub default_year: i32,
    pub window_width: f32,
    pub window_height: f32,
    /// Pixel size of exported PNG charts.
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_URL.to_string(),
            default_mode: ReportMode::Yearly,
            default_year: MIN_YEAR,
            window_width: 1400.0,
            window_height: 900.0,
            chart_width: 1000,
            chart_height: 700,
        }
    }
}

impl DashboardConfig {
    /// Read a config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), "config loaded");
        Ok(config.normalized())
    }

    /// Explicit path if given, else `autosales_dashboard.json` when present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            return Self::load(implicit);
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    fn normalized(mut self) -> Self {
        self.default_year = self.default_year.clamp(MIN_YEAR, MAX_YEAR);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "data_source": "sales.csv", "default_mode": "recession" }"#)
                .unwrap();
        assert_eq!(config.data_source, "sales.csv");
        assert_eq!(config.default_mode, ReportMode::Recession);
        assert_eq!(config.default_year, 1980);
        assert_eq!(config.chart_width, 1000);
    }

    #[test]
    fn out_of_range_default_year_is_clamped() {
        let dir = std::env::temp_dir().join(format!("autosales_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "default_year": 2050 }"#).unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.default_year, 2023);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = DashboardConfig::resolve(Some(Path::new("/nonexistent/autosales.json")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
