//! Report Module
//! Turns a selection into the four derived tables shown for that mode.

use crate::data::{Month, SalesRecord, SalesTable};
use crate::stats::aggregator::{aggregate, RateKey, Reduction};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub const MIN_YEAR: i32 = 1980;
pub const MAX_YEAR: i32 = 2023;

/// Report type chosen in the statistics selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    #[default]
    Yearly,
    Recession,
}

impl ReportMode {
    pub const ALL: [ReportMode; 2] = [ReportMode::Yearly, ReportMode::Recession];

    pub fn label(self) -> &'static str {
        match self {
            ReportMode::Yearly => "Yearly Statistics",
            ReportMode::Recession => "Recession Period Statistics",
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the user asked to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Recession,
    Yearly(i32),
}

impl Selection {
    /// Combine the two selector values. The year is dropped in recession mode.
    pub fn from_inputs(mode: ReportMode, year: i32) -> Self {
        match mode {
            ReportMode::Recession => Selection::Recession,
            ReportMode::Yearly => Selection::Yearly(year),
        }
    }

    pub fn is_valid(self) -> bool {
        match self {
            Selection::Recession => true,
            Selection::Yearly(year) => is_valid_year(year),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Recession => f.write_str("recession"),
            Selection::Yearly(year) => write!(f, "yearly {}", year),
        }
    }
}

pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySales {
    pub year: i32,
    pub avg_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub month: Month,
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeSales {
    pub vehicle_type: String,
    pub avg_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleTypeExpenditure {
    pub vehicle_type: String,
    pub total_expenditure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnemploymentEffect {
    pub unemployment_rate: f64,
    pub vehicle_type: String,
    pub avg_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecessionReport {
    pub yearly_recession_sales: Vec<YearlySales>,
    pub avg_sales_by_vehicle_type: Vec<VehicleTypeSales>,
    pub ad_expenditure_share_by_vehicle_type: Vec<VehicleTypeExpenditure>,
    pub unemployment_effect: Vec<UnemploymentEffect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyReport {
    pub year: i32,
    pub yearly_overall_sales: Vec<YearlySales>,
    pub monthly_sales: Vec<MonthlySales>,
    pub avg_sales_by_vehicle_type: Vec<VehicleTypeSales>,
    pub ad_expenditure_by_vehicle_type: Vec<VehicleTypeExpenditure>,
}

/// Derived tables for one selection. `Empty` means nothing should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReportOutput {
    Recession(RecessionReport),
    Yearly(YearlyReport),
    Empty,
}

impl ReportOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, ReportOutput::Empty)
    }
}

/// Compute every table for `selection`. Pure: the table is only read.
pub fn compute_report(table: &SalesTable, selection: Selection) -> ReportOutput {
    let output = match selection {
        Selection::Recession => ReportOutput::Recession(recession_report(table)),
        Selection::Yearly(year) if !selection.is_valid() => {
            warn!(year, "year outside {}..={}, nothing to report", MIN_YEAR, MAX_YEAR);
            ReportOutput::Empty
        }
        Selection::Yearly(year) => ReportOutput::Yearly(yearly_report(table, year)),
    };
    debug!(%selection, empty = output.is_empty(), "report computed");
    output
}

pub fn recession_report(table: &SalesTable) -> RecessionReport {
    RecessionReport {
        yearly_recession_sales: yearly_recession_sales(table),
        avg_sales_by_vehicle_type: avg_sales_by_vehicle_type(table),
        ad_expenditure_share_by_vehicle_type: ad_expenditure_share_by_vehicle_type(table),
        unemployment_effect: unemployment_effect(table),
    }
}

pub fn yearly_report(table: &SalesTable, year: i32) -> YearlyReport {
    YearlyReport {
        year,
        yearly_overall_sales: yearly_overall_sales(table),
        monthly_sales: monthly_sales_for_year(table, year),
        avg_sales_by_vehicle_type: avg_sales_by_vehicle_type_for_year(table, year),
        ad_expenditure_by_vehicle_type: ad_expenditure_by_vehicle_type_for_year(table, year),
    }
}

fn in_recession(record: &SalesRecord) -> bool {
    record.recession
}

fn sales(record: &SalesRecord) -> f64 {
    record.automobile_sales
}

fn expenditure(record: &SalesRecord) -> f64 {
    record.advertising_expenditure
}

fn vehicle_type(record: &SalesRecord) -> String {
    record.vehicle_type.clone()
}

/// Mean sales per year over recession rows only.
pub fn yearly_recession_sales(table: &SalesTable) -> Vec<YearlySales> {
    aggregate(table.records(), in_recession, |r| r.year, sales, Reduction::Mean)
        .into_iter()
        .map(|(year, avg_sales)| YearlySales { year, avg_sales })
        .collect()
}

/// Mean sales per vehicle type over recession rows.
pub fn avg_sales_by_vehicle_type(table: &SalesTable) -> Vec<VehicleTypeSales> {
    aggregate(table.records(), in_recession, vehicle_type, sales, Reduction::Mean)
        .into_iter()
        .map(|(vehicle_type, avg_sales)| VehicleTypeSales {
            vehicle_type,
            avg_sales,
        })
        .collect()
}

/// Total advertising spend per vehicle type over recession rows.
pub fn ad_expenditure_share_by_vehicle_type(table: &SalesTable) -> Vec<VehicleTypeExpenditure> {
    aggregate(table.records(), in_recession, vehicle_type, expenditure, Reduction::Sum)
        .into_iter()
        .map(|(vehicle_type, total_expenditure)| VehicleTypeExpenditure {
            vehicle_type,
            total_expenditure,
        })
        .collect()
}

/// Mean sales per (unemployment rate, vehicle type) over recession rows.
pub fn unemployment_effect(table: &SalesTable) -> Vec<UnemploymentEffect> {
    aggregate(
        table.records(),
        in_recession,
        |r| (RateKey(r.unemployment_rate), r.vehicle_type.clone()),
        sales,
        Reduction::Mean,
    )
    .into_iter()
    .map(|((rate, vehicle_type), avg_sales)| UnemploymentEffect {
        unemployment_rate: rate.0,
        vehicle_type,
        avg_sales,
    })
    .collect()
}

/// Mean sales per year over the whole table. Ignores any year selection.
pub fn yearly_overall_sales(table: &SalesTable) -> Vec<YearlySales> {
    aggregate(table.records(), |_| true, |r| r.year, sales, Reduction::Mean)
        .into_iter()
        .map(|(year, avg_sales)| YearlySales { year, avg_sales })
        .collect()
}

/// Total sales per month of `year`, Jan first.
pub fn monthly_sales_for_year(table: &SalesTable, year: i32) -> Vec<MonthlySales> {
    aggregate(table.records(), |r| r.year == year, |r| r.month, sales, Reduction::Sum)
        .into_iter()
        .map(|(month, total_sales)| MonthlySales { month, total_sales })
        .collect()
}

pub fn avg_sales_by_vehicle_type_for_year(table: &SalesTable, year: i32) -> Vec<VehicleTypeSales> {
    aggregate(table.records(), |r| r.year == year, vehicle_type, sales, Reduction::Mean)
        .into_iter()
        .map(|(vehicle_type, avg_sales)| VehicleTypeSales {
            vehicle_type,
            avg_sales,
        })
        .collect()
}

pub fn ad_expenditure_by_vehicle_type_for_year(
    table: &SalesTable,
    year: i32,
) -> Vec<VehicleTypeExpenditure> {
    aggregate(table.records(), |r| r.year == year, vehicle_type, expenditure, Reduction::Sum)
        .into_iter()
        .map(|(vehicle_type, total_expenditure)| VehicleTypeExpenditure {
            vehicle_type,
            total_expenditure,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        year: i32,
        month: Month,
        vehicle: &str,
        sales: f64,
        ad: f64,
        rate: f64,
        recession: bool,
    ) -> SalesRecord {
        SalesRecord {
            year,
            month,
            vehicle_type: vehicle.to_string(),
            automobile_sales: sales,
            advertising_expenditure: ad,
            unemployment_rate: rate,
            recession,
        }
    }

    fn table() -> SalesTable {
        SalesTable::new(vec![
            row(1980, Month::Jan, "Sports", 10.0, 100.0, 5.0, false),
            row(1980, Month::Feb, "Sports", 20.0, 100.0, 5.0, false),
            row(1980, Month::Jan, "SUV", 30.0, 200.0, 5.0, true),
            row(1982, Month::Dec, "Sports", 8.0, 50.0, 9.5, true),
            row(1982, Month::Mar, "Executivecar", 4.0, 70.0, 9.5, true),
            row(1982, Month::Mar, "Sports", 12.0, 30.0, 7.0, true),
        ])
    }

    #[test]
    fn recession_tables_use_recession_rows_only() {
        let report = recession_report(&table());

        assert_eq!(
            report.yearly_recession_sales,
            vec![
                YearlySales { year: 1980, avg_sales: 30.0 },
                YearlySales { year: 1982, avg_sales: 8.0 },
            ]
        );
        assert_eq!(
            report.avg_sales_by_vehicle_type,
            vec![
                VehicleTypeSales { vehicle_type: "Executivecar".into(), avg_sales: 4.0 },
                VehicleTypeSales { vehicle_type: "SUV".into(), avg_sales: 30.0 },
                VehicleTypeSales { vehicle_type: "Sports".into(), avg_sales: 10.0 },
            ]
        );
        assert_eq!(
            report.ad_expenditure_share_by_vehicle_type,
            vec![
                VehicleTypeExpenditure { vehicle_type: "Executivecar".into(), total_expenditure: 70.0 },
                VehicleTypeExpenditure { vehicle_type: "SUV".into(), total_expenditure: 200.0 },
                VehicleTypeExpenditure { vehicle_type: "Sports".into(), total_expenditure: 80.0 },
            ]
        );
    }

    #[test]
    fn unemployment_rows_are_keyed_by_rate_then_type() {
        let effect = unemployment_effect(&table());
        let keys: Vec<(f64, &str, f64)> = effect
            .iter()
            .map(|e| (e.unemployment_rate, e.vehicle_type.as_str(), e.avg_sales))
            .collect();
        assert_eq!(
            keys,
            vec![
                (5.0, "SUV", 30.0),
                (7.0, "Sports", 12.0),
                (9.5, "Executivecar", 4.0),
                (9.5, "Sports", 8.0),
            ]
        );
    }

    #[test]
    fn monthly_sales_follow_calendar_order() {
        let monthly = monthly_sales_for_year(&table(), 1982);
        let months: Vec<Month> = monthly.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![Month::Mar, Month::Dec]);
        assert_eq!(monthly[0].total_sales, 16.0);
    }

    #[test]
    fn selection_ignores_year_in_recession_mode() {
        assert_eq!(Selection::from_inputs(ReportMode::Recession, 1999), Selection::Recession);
        assert_eq!(Selection::from_inputs(ReportMode::Yearly, 1999), Selection::Yearly(1999));
        assert!(Selection::Recession.is_valid());
        assert!(!Selection::Yearly(1979).is_valid());
    }

    #[test]
    fn out_of_range_year_is_empty() {
        assert_eq!(compute_report(&table(), Selection::Yearly(1979)), ReportOutput::Empty);
        assert_eq!(compute_report(&table(), Selection::Yearly(2024)), ReportOutput::Empty);
    }

    #[test]
    fn valid_year_with_no_rows_yields_empty_tables() {
        let ReportOutput::Yearly(report) = compute_report(&table(), Selection::Yearly(2000)) else {
            panic!("expected a yearly report");
        };
        assert!(report.monthly_sales.is_empty());
        assert!(report.avg_sales_by_vehicle_type.is_empty());
        assert_eq!(report.yearly_overall_sales.len(), 2);
    }

    #[test]
    fn report_serializes_with_mode_tag() {
        let json = serde_json::to_value(compute_report(&table(), Selection::Yearly(1980))).unwrap();
        assert_eq!(json["mode"], "yearly");
        assert_eq!(json["year"], 1980);
        assert_eq!(json["monthly_sales"][0]["month"], "Jan");

        let empty = serde_json::to_string(&ReportOutput::Empty).unwrap();
        assert_eq!(empty, r#"{"mode":"empty"}"#);
    }
}
