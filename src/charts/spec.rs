//! Chart Specification Module
//! Maps report tables to renderer-independent chart descriptions.

use crate::stats::{RecessionReport, ReportOutput, UnemploymentEffect, YearlyReport};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    Line,
    Bar,
    StackedBar,
    Pie,
}

/// A labelled point. `x` is the numeric position, `label` what the axis shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// One colored segment series of a stacked bar chart, aligned with the categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartBody {
    Points(Vec<ChartPoint>),
    Stacked {
        categories: Vec<String>,
        series: Vec<SegmentSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Legend heading for series-colored charts.
    pub legend_title: Option<String>,
    pub body: ChartBody,
}

impl ChartSpec {
    fn points(
        id: &str,
        title: impl Into<String>,
        kind: ChartKind,
        x_label: &str,
        y_label: &str,
        points: Vec<ChartPoint>,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.into(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            legend_title: None,
            body: ChartBody::Points(points),
        }
    }

    /// Charts for a report, in display order. `Empty` has none.
    pub fn for_report(report: &ReportOutput) -> Vec<ChartSpec> {
        match report {
            ReportOutput::Recession(r) => Self::recession_charts(r),
            ReportOutput::Yearly(y) => Self::yearly_charts(y),
            ReportOutput::Empty => Vec::new(),
        }
    }

    fn recession_charts(report: &RecessionReport) -> Vec<ChartSpec> {
        vec![
            Self::points(
                "recession_yearly_sales",
                "Average Automobile Sales fluctuation over Recession Period",
                ChartKind::Line,
                "Year",
                "Automobile_Sales",
                report
                    .yearly_recession_sales
                    .iter()
                    .map(|s| year_point(s.year, s.avg_sales))
                    .collect(),
            ),
            Self::points(
                "recession_vehicle_sales",
                "Average Number of Vehicles Sold by Vehicle Type during Recession Period",
                ChartKind::Bar,
                "Vehicle_Type",
                "Automobile_Sales",
                categorical(
                    report
                        .avg_sales_by_vehicle_type
                        .iter()
                        .map(|s| (s.vehicle_type.as_str(), s.avg_sales)),
                ),
            ),
            Self::points(
                "recession_ad_share",
                "Total Expenditure Share by Vehicle Type during Recessions",
                ChartKind::Pie,
                "Vehicle_Type",
                "Advertising_Expenditure",
                categorical(
                    report
                        .ad_expenditure_share_by_vehicle_type
                        .iter()
                        .map(|e| (e.vehicle_type.as_str(), e.total_expenditure)),
                ),
            ),
            unemployment_chart(&report.unemployment_effect),
        ]
    }

    fn yearly_charts(report: &YearlyReport) -> Vec<ChartSpec> {
        vec![
            Self::points(
                "yearly_sales",
                "Yearly Automobile Sales",
                ChartKind::Line,
                "Year",
                "Automobile_Sales",
                report
                    .yearly_overall_sales
                    .iter()
                    .map(|s| year_point(s.year, s.avg_sales))
                    .collect(),
            ),
            Self::points(
                "monthly_sales",
                format!("Total Monthly Automobile Sales in {}", report.year),
                ChartKind::Line,
                "Month",
                "Automobile_Sales",
                report
                    .monthly_sales
                    .iter()
                    .map(|m| ChartPoint {
                        label: m.month.abbrev().to_string(),
                        x: f64::from(m.month.number()),
                        y: m.total_sales,
                    })
                    .collect(),
            ),
            Self::points(
                "yearly_vehicle_sales",
                format!("Average Vehicles Sold by Vehicle Type in the year {}", report.year),
                ChartKind::Bar,
                "Vehicle_Type",
                "Automobile_Sales",
                categorical(
                    report
                        .avg_sales_by_vehicle_type
                        .iter()
                        .map(|s| (s.vehicle_type.as_str(), s.avg_sales)),
                ),
            ),
            Self::points(
                "yearly_ad_expenditure",
                "Total Advertisement Expenditure for Each Vehicle",
                ChartKind::Pie,
                "Vehicle_Type",
                "Advertising_Expenditure",
                categorical(
                    report
                        .ad_expenditure_by_vehicle_type
                        .iter()
                        .map(|e| (e.vehicle_type.as_str(), e.total_expenditure)),
                ),
            ),
        ]
    }

    /// Category labels in x order, for bar and pie charts.
    pub fn categories(&self) -> Vec<String> {
        match &self.body {
            ChartBody::Points(points) => points.iter().map(|p| p.label.clone()).collect(),
            ChartBody::Stacked { categories, .. } => categories.clone(),
        }
    }

    /// Smallest and largest y the chart needs to show. Stacked bars use
    /// their column totals. Always includes zero.
    pub fn value_bounds(&self) -> (f64, f64) {
        let values: Vec<f64> = match &self.body {
            ChartBody::Points(points) => points.iter().map(|p| p.y).collect(),
            ChartBody::Stacked { categories, series } => (0..categories.len())
                .map(|i| series.iter().filter_map(|s| s.values[i]).sum())
                .collect(),
        };
        values
            .into_iter()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }

    pub fn is_empty(&self) -> bool {
        match &self.body {
            ChartBody::Points(points) => points.is_empty(),
            ChartBody::Stacked { series, .. } => series.is_empty(),
        }
    }
}

fn year_point(year: i32, value: f64) -> ChartPoint {
    ChartPoint {
        label: year.to_string(),
        x: f64::from(year),
        y: value,
    }
}

fn categorical<'a>(rows: impl Iterator<Item = (&'a str, f64)>) -> Vec<ChartPoint> {
    rows.enumerate()
        .map(|(i, (label, y))| ChartPoint {
            label: label.to_string(),
            x: i as f64,
            y,
        })
        .collect()
}

/// Vehicle types along x, one stacked segment per unemployment rate.
fn unemployment_chart(rows: &[UnemploymentEffect]) -> ChartSpec {
    let categories: Vec<String> = rows
        .iter()
        .map(|r| r.vehicle_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // Rows arrive sorted by rate, so consecutive rows share a series.
    let mut series: Vec<(f64, SegmentSeries)> = Vec::new();
    for row in rows {
        let needs_new = series
            .last()
            .map_or(true, |(rate, _)| rate.total_cmp(&row.unemployment_rate).is_ne());
        if needs_new {
            series.push((
                row.unemployment_rate,
                SegmentSeries {
                    name: format_rate(row.unemployment_rate),
                    values: vec![None; categories.len()],
                },
            ));
        }
        if let (Some((_, current)), Some(idx)) = (
            series.last_mut(),
            categories.iter().position(|c| c == &row.vehicle_type),
        ) {
            current.values[idx] = Some(row.avg_sales);
        }
    }

    ChartSpec {
        id: "recession_unemployment_effect".to_string(),
        title: "Effect of Unemployment Rate on Vehicle Type and Sales".to_string(),
        kind: ChartKind::StackedBar,
        x_label: "Vehicle_Type".to_string(),
        y_label: "Average Automobile Sales".to_string(),
        legend_title: Some("Unemployment Rate".to_string()),
        body: ChartBody::Stacked {
            categories,
            series: series.into_iter().map(|(_, s)| s).collect(),
        },
    }
}

fn format_rate(rate: f64) -> String {
    let formatted = format!("{:.2}", rate);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Month;
    use crate::stats::{MonthlySales, VehicleTypeExpenditure, VehicleTypeSales, YearlySales};

    fn yearly() -> ReportOutput {
        ReportOutput::Yearly(YearlyReport {
            year: 1980,
            yearly_overall_sales: vec![YearlySales { year: 1980, avg_sales: 12.5 }],
            monthly_sales: vec![
                MonthlySales { month: Month::Jan, total_sales: 40.0 },
                MonthlySales { month: Month::Feb, total_sales: 20.0 },
            ],
            avg_sales_by_vehicle_type: vec![VehicleTypeSales {
                vehicle_type: "Sports".into(),
                avg_sales: 15.0,
            }],
            ad_expenditure_by_vehicle_type: vec![VehicleTypeExpenditure {
                vehicle_type: "Sports".into(),
                total_expenditure: 200.0,
            }],
        })
    }

    #[test]
    fn yearly_report_maps_to_four_charts() {
        let charts = ChartSpec::for_report(&yearly());
        let kinds: Vec<ChartKind> = charts.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ChartKind::Line, ChartKind::Line, ChartKind::Bar, ChartKind::Pie]
        );
        assert_eq!(charts[1].title, "Total Monthly Automobile Sales in 1980");
        assert_eq!(charts[1].categories(), vec!["Jan", "Feb"]);
        let ChartBody::Points(points) = &charts[1].body else {
            panic!("monthly chart should be a point chart");
        };
        assert_eq!(points[1].x, 2.0);
    }

    #[test]
    fn empty_report_has_no_charts() {
        assert!(ChartSpec::for_report(&ReportOutput::Empty).is_empty());
    }

    #[test]
    fn unemployment_rows_become_stacked_series() {
        let rows = vec![
            UnemploymentEffect { unemployment_rate: 2.5, vehicle_type: "Sports".into(), avg_sales: 4.0 },
            UnemploymentEffect { unemployment_rate: 6.0, vehicle_type: "Executivecar".into(), avg_sales: 1.0 },
            UnemploymentEffect { unemployment_rate: 6.0, vehicle_type: "Sports".into(), avg_sales: 3.0 },
        ];
        let chart = unemployment_chart(&rows);
        let ChartBody::Stacked { categories, series } = &chart.body else {
            panic!("expected stacked body");
        };
        assert_eq!(categories, &vec!["Executivecar".to_string(), "Sports".to_string()]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "2.5");
        assert_eq!(series[0].values, vec![None, Some(4.0)]);
        assert_eq!(series[1].name, "6");
        assert_eq!(series[1].values, vec![Some(1.0), Some(3.0)]);
        assert_eq!(chart.value_bounds(), (0.0, 7.0));
    }
}
