//! Stats module - group-by aggregation and report computation

pub mod aggregator;
pub mod report;

pub use aggregator::{aggregate, RateKey, Reduction};
pub use report::{
    ad_expenditure_by_vehicle_type_for_year, ad_expenditure_share_by_vehicle_type,
    avg_sales_by_vehicle_type, avg_sales_by_vehicle_type_for_year, compute_report,
    is_valid_year, monthly_sales_for_year, recession_report, unemployment_effect,
    yearly_overall_sales, yearly_recession_sales, yearly_report, MonthlySales, RecessionReport,
    ReportMode, ReportOutput, Selection, UnemploymentEffect, VehicleTypeExpenditure,
    VehicleTypeSales, YearlyReport, YearlySales, MAX_YEAR, MIN_YEAR,
};
