//! CSV Data Loader Module
//! Loads the sales dataset with Polars and converts it into a typed `SalesTable`.

use crate::data::table::{Month, SalesRecord, SalesTable};
use polars::prelude::*;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Location of the historical automobile sales CSV used when nothing else is configured.
pub const DEFAULT_DATA_URL: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/historical_automobile_sales.csv";

pub const COL_YEAR: &str = "Year";
pub const COL_MONTH: &str = "Month";
pub const COL_VEHICLE_TYPE: &str = "Vehicle_Type";
pub const COL_SALES: &str = "Automobile_Sales";
pub const COL_AD_EXPENDITURE: &str = "Advertising_Expenditure";
pub const COL_UNEMPLOYMENT: &str = "unemployment_rate";
pub const COL_RECESSION: &str = "Recession";

/// Columns the dataset must carry. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_YEAR,
    COL_MONTH,
    COL_VEHICLE_TYPE,
    COL_SALES,
    COL_AD_EXPENDITURE,
    COL_UNEMPLOYMENT,
    COL_RECESSION,
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to download dataset: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Invalid value in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        reason: String,
    },
}

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` sources are downloaded, everything else is a local path.
    pub fn parse(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Loads the dataset once and hands back an immutable table.
pub struct DataLoader {
    source: DataSource,
}

impl DataLoader {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Read, validate and convert the configured source.
    pub fn load(&self) -> Result<SalesTable, LoaderError> {
        info!(source = %self.source, "loading sales dataset");
        let df = match &self.source {
            DataSource::File(path) => Self::read_csv_file(path)?,
            DataSource::Url(url) => Self::fetch_csv(url)?,
        };
        debug!(rows = df.height(), columns = df.width(), "csv parsed");

        let table = Self::table_from_dataframe(&df)?;
        let (first_year, last_year) = table.year_span().unwrap_or_default();
        info!(
            rows = table.len(),
            recession_rows = table.recession_rows(),
            first_year,
            last_year,
            "sales dataset loaded"
        );
        Ok(table)
    }

    /// Load a local CSV file using Polars' lazy reader.
    pub fn read_csv_file(path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Download a CSV over HTTP and parse it from memory.
    pub fn fetch_csv(url: &str) -> Result<DataFrame, LoaderError> {
        let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
        debug!(bytes = bytes.len(), "dataset downloaded");

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(df)
    }

    /// Convert a parsed DataFrame into typed records, rejecting any row that
    /// would poison a mean or sum later on.
    pub fn table_from_dataframe(df: &DataFrame) -> Result<SalesTable, LoaderError> {
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                return Err(LoaderError::MissingColumn(name.to_string()));
            }
        }

        let years = Self::integer_column(df, COL_YEAR)?;
        let months = Self::string_column(df, COL_MONTH)?;
        let vehicle_types = Self::string_column(df, COL_VEHICLE_TYPE)?;
        let sales = Self::numeric_column(df, COL_SALES)?;
        let expenditures = Self::numeric_column(df, COL_AD_EXPENDITURE)?;
        let rates = Self::numeric_column(df, COL_UNEMPLOYMENT)?;
        let recession_flags = Self::integer_column(df, COL_RECESSION)?;

        let mut records = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let year = i32::try_from(years[row]).map_err(|_| LoaderError::InvalidValue {
                column: COL_YEAR.to_string(),
                row,
                reason: format!("{} is not a valid year", years[row]),
            })?;
            let month: Month = months[row].parse().map_err(|e: crate::data::table::UnknownMonth| {
                LoaderError::InvalidValue {
                    column: COL_MONTH.to_string(),
                    row,
                    reason: e.to_string(),
                }
            })?;
            let recession = match recession_flags[row] {
                0 => false,
                1 => true,
                other => {
                    return Err(LoaderError::InvalidValue {
                        column: COL_RECESSION.to_string(),
                        row,
                        reason: format!("expected 0 or 1, found {}", other),
                    })
                }
            };

            records.push(SalesRecord {
                year,
                month,
                vehicle_type: vehicle_types[row].clone(),
                automobile_sales: sales[row],
                advertising_expenditure: expenditures[row],
                unemployment_rate: rates[row],
                recession,
            });
        }

        Ok(SalesTable::new(records))
    }

    /// Numeric column as f64. Nulls, unparsable strings and NaN/inf are rejected.
    fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
        let column = df
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
        let value_f64 = column.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;

        value_ca
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if v.is_finite() => Ok(v),
                Some(v) => Err(Self::invalid(name, row, format!("{} is not finite", v))),
                None => Err(Self::invalid(name, row, "missing or non-numeric".to_string())),
            })
            .collect()
    }

    /// Whole-number column. Read as f64 first so a fractional cell is rejected
    /// instead of being truncated by an integer cast.
    fn integer_column(df: &DataFrame, name: &str) -> Result<Vec<i64>, LoaderError> {
        Self::numeric_column(df, name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
                    Err(Self::invalid(name, row, format!("{} is not a whole number", value)))
                } else {
                    Ok(value as i64)
                }
            })
            .collect()
    }

    fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, LoaderError> {
        let column = df
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
        let as_string = column.cast(&DataType::String)?;
        let series = as_string.as_materialized_series();
        let value_ca = series.str()?;

        value_ca
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(Self::invalid(name, row, "missing value".to_string())),
            })
            .collect()
    }

    fn invalid(column: &str, row: usize, reason: String) -> LoaderError {
        LoaderError::InvalidValue {
            column: column.to_string(),
            row,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Date".into(), vec!["1/31/1980", "2/29/1980", "1/31/1981"]),
            Column::new(COL_YEAR.into(), vec![1980i64, 1980, 1981]),
            Column::new(COL_MONTH.into(), vec!["Jan", "Feb", "Jan"]),
            Column::new(COL_RECESSION.into(), vec![1i64, 0, 0]),
            Column::new(COL_SALES.into(), vec![456.0f64, 555.9, 620.0]),
            Column::new(COL_AD_EXPENDITURE.into(), vec![1558.0f64, 3048.0, 2000.0]),
            Column::new(COL_UNEMPLOYMENT.into(), vec![5.4f64, 4.8, 3.1]),
            Column::new(
                COL_VEHICLE_TYPE.into(),
                vec!["Supperminicar", "Executivecar", "Sports"],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn converts_frame_into_typed_records() {
        let table = DataLoader::table_from_dataframe(&sample_frame()).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.records()[0];
        assert_eq!(first.year, 1980);
        assert_eq!(first.month, Month::Jan);
        assert_eq!(first.vehicle_type, "Supperminicar");
        assert_eq!(first.automobile_sales, 456.0);
        assert_eq!(first.advertising_expenditure, 1558.0);
        assert_eq!(first.unemployment_rate, 5.4);
        assert!(first.recession);
        assert!(!table.records()[1].recession);
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let df = sample_frame().drop(COL_UNEMPLOYMENT).unwrap();
        match DataLoader::table_from_dataframe(&df) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, COL_UNEMPLOYMENT),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn null_sales_value_is_rejected() {
        let df = DataFrame::new(vec![
            Column::new(COL_YEAR.into(), vec![1980i64, 1980]),
            Column::new(COL_MONTH.into(), vec!["Jan", "Feb"]),
            Column::new(COL_RECESSION.into(), vec![0i64, 0]),
            Column::new(COL_SALES.into(), vec![Some(10.0f64), None]),
            Column::new(COL_AD_EXPENDITURE.into(), vec![1.0f64, 1.0]),
            Column::new(COL_UNEMPLOYMENT.into(), vec![5.0f64, 5.0]),
            Column::new(COL_VEHICLE_TYPE.into(), vec!["Sports", "Sports"]),
        ])
        .unwrap();

        match DataLoader::table_from_dataframe(&df) {
            Err(LoaderError::InvalidValue { column, row, .. }) => {
                assert_eq!(column, COL_SALES);
                assert_eq!(row, 1);
            }
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn unknown_month_and_bad_recession_flag_are_rejected() {
        let mut df = sample_frame();
        df.replace(COL_MONTH, Series::new(COL_MONTH.into(), ["Jan", "Fbr", "Jan"]))
            .unwrap();
        assert!(matches!(
            DataLoader::table_from_dataframe(&df),
            Err(LoaderError::InvalidValue { ref column, row: 1, .. }) if column == COL_MONTH
        ));

        let mut df = sample_frame();
        df.replace(COL_RECESSION, Series::new(COL_RECESSION.into(), [0i64, 2, 0]))
            .unwrap();
        assert!(matches!(
            DataLoader::table_from_dataframe(&df),
            Err(LoaderError::InvalidValue { ref column, row: 1, .. }) if column == COL_RECESSION
        ));
    }

    #[test]
    fn fractional_year_and_recession_flag_are_rejected() {
        let mut df = sample_frame();
        df.replace(COL_RECESSION, Series::new(COL_RECESSION.into(), [1.0f64, 0.5, 0.0]))
            .unwrap();
        assert!(matches!(
            DataLoader::table_from_dataframe(&df),
            Err(LoaderError::InvalidValue { ref column, row: 1, .. }) if column == COL_RECESSION
        ));

        let mut df = sample_frame();
        df.replace(COL_YEAR, Series::new(COL_YEAR.into(), [1980.9f64, 1980.0, 1981.0]))
            .unwrap();
        assert!(matches!(
            DataLoader::table_from_dataframe(&df),
            Err(LoaderError::InvalidValue { ref column, row: 0, .. }) if column == COL_YEAR
        ));
    }

    #[test]
    fn whole_float_cells_still_load() {
        let mut df = sample_frame();
        df.replace(COL_RECESSION, Series::new(COL_RECESSION.into(), [1.0f64, 0.0, 0.0]))
            .unwrap();
        let table = DataLoader::table_from_dataframe(&df).unwrap();
        assert!(table.records()[0].recession);
        assert!(!table.records()[1].recession);
    }

    #[test]
    fn source_parsing_distinguishes_urls_from_paths() {
        assert_eq!(
            DataSource::parse("https://example.com/sales.csv"),
            DataSource::Url("https://example.com/sales.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("data/sales.csv"),
            DataSource::File(PathBuf::from("data/sales.csv"))
        );
    }
}
