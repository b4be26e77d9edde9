//! Static Chart Renderer
//! Renders chart specs to PNG images with plotters, for export.
//!
//! Each chart is drawn into an in-memory RGB buffer and then encoded with the
//! `image` crate, so callers get bytes they can write anywhere.

use crate::charts::{ChartBody, ChartKind, ChartPoint, ChartSpec};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(121, 85, 72),
    RGBColor(96, 125, 139),
];
const LINE_COLOR: RGBColor = PALETTE[0];
const GRID: RGBColor = RGBColor(220, 220, 220);

const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Image buffer size mismatch for {0}x{1}")]
    Buffer(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one chart to PNG bytes.
    pub fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::draw(&root, spec).map_err(|e| RenderError::Draw(e.to_string()))?;
            root.present().map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        let img = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer(width, height))?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }

    /// Render every chart in parallel and write `NN_<id>.png` files into `dir`.
    pub fn export_report(
        specs: &[ChartSpec],
        dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir)?;

        let rendered: Vec<(PathBuf, Vec<u8>)> = specs
            .par_iter()
            .enumerate()
            .map(|(idx, spec)| {
                let png = Self::render_png(spec, width, height)?;
                Ok((dir.join(Self::file_name(idx, spec)), png))
            })
            .collect::<Result<_, RenderError>>()?;

        let mut paths = Vec::with_capacity(rendered.len());
        for (path, png) in rendered {
            std::fs::write(&path, png)?;
            debug!(path = %path.display(), "chart written");
            paths.push(path);
        }
        info!(count = paths.len(), dir = %dir.display(), "charts exported");
        Ok(paths)
    }

    pub fn file_name(index: usize, spec: &ChartSpec) -> String {
        let safe_name: String = spec
            .id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{:02}_{}.png", index + 1, safe_name)
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        if spec.is_empty() {
            let (w, h) = root.dim_in_pixel();
            root.draw(&Text::new(
                spec.title.clone(),
                (20, 20),
                (FONT, 22).into_font(),
            ))?;
            root.draw(&Text::new(
                "No data for this selection",
                (w as i32 / 2 - 110, h as i32 / 2),
                (FONT, 18).into_font().color(&BLACK.mix(0.5)),
            ))?;
            return Ok(());
        }

        match (&spec.kind, &spec.body) {
            (ChartKind::Line, ChartBody::Points(points)) => Self::draw_line(root, spec, points),
            (ChartKind::Bar, ChartBody::Points(points)) => Self::draw_bars(root, spec, points),
            (ChartKind::Pie, ChartBody::Points(points)) => Self::draw_pie(root, spec, points),
            (ChartKind::StackedBar, ChartBody::Stacked { categories, series }) => {
                let (_, y_max) = spec.value_bounds();
                let mut chart = Self::categorical_chart(root, spec, categories.len(), y_max)?;
                let labels = categories.clone();
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .light_line_style(&GRID)
                    .x_labels(categories.len() + 1)
                    .x_label_formatter(&|x| Self::category_label(&labels, *x))
                    .x_desc(spec.x_label.as_str())
                    .y_desc(spec.y_label.as_str())
                    .draw()?;

                let mut bases = vec![0.0; categories.len()];
                for (s_idx, segment) in series.iter().enumerate() {
                    let color = PALETTE[s_idx % PALETTE.len()];
                    let mut rects = Vec::new();
                    for (i, value) in segment.values.iter().enumerate() {
                        if let Some(v) = value {
                            let x = i as f64;
                            rects.push(Rectangle::new(
                                [(x - 0.3, bases[i]), (x + 0.3, bases[i] + v)],
                                color.filled(),
                            ));
                            bases[i] += v;
                        }
                    }
                    chart
                        .draw_series(rects)?
                        .label(segment.name.clone())
                        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
                }

                chart
                    .configure_series_labels()
                    .position(SeriesLabelPosition::UpperRight)
                    .background_style(&WHITE.mix(0.85))
                    .border_style(&BLACK.mix(0.4))
                    .draw()?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn draw_line<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        points: &[ChartPoint],
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let x_min = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let x_max = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let (x_min, x_max) = if x_max > x_min {
            (x_min, x_max)
        } else {
            (x_min - 1.0, x_max + 1.0)
        };
        let (y_lo, y_hi) = spec.value_bounds();
        let y_hi = Self::pad(y_hi);

        let mut chart = ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_lo..y_hi)?;

        let labels: Vec<(f64, String)> = points.iter().map(|p| (p.x, p.label.clone())).collect();
        let formatter = |x: &f64| {
            labels
                .iter()
                .find(|(px, _)| (px - x).abs() < 1e-6)
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| format!("{:.0}", x))
        };
        chart
            .configure_mesh()
            .light_line_style(&GRID)
            .x_labels(points.len().clamp(2, 12))
            .x_label_formatter(&formatter)
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;

        chart.draw_series(LineSeries::new(
            points.iter().map(|p| (p.x, p.y)),
            LINE_COLOR.stroke_width(2),
        ))?;
        chart.draw_series(
            points
                .iter()
                .map(|p| Circle::new((p.x, p.y), 3, LINE_COLOR.filled())),
        )?;
        Ok(())
    }

    fn draw_bars<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        points: &[ChartPoint],
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let (_, y_max) = spec.value_bounds();
        let mut chart = Self::categorical_chart(root, spec, points.len(), y_max)?;
        let labels = spec.categories();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .light_line_style(&GRID)
            .x_labels(points.len() + 1)
            .x_label_formatter(&|x| Self::category_label(&labels, *x))
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .draw()?;

        chart.draw_series(points.iter().map(|p| {
            Rectangle::new([(p.x - 0.3, 0.0), (p.x + 0.3, p.y)], LINE_COLOR.filled())
        }))?;
        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        points: &[ChartPoint],
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let titled = root.titled(spec.title.as_str(), (FONT, 22).into_font())?;
        let (w, h) = titled.dim_in_pixel();

        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.35;
        let sizes: Vec<f64> = points.iter().map(|p| p.y.max(0.0)).collect();
        let colors: Vec<RGBColor> = (0..points.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();
        let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();

        if sizes.iter().sum::<f64>() <= 0.0 {
            return Ok(());
        }

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style((FONT, 16).into_font().color(&BLACK));
        pie.percentages((FONT, 14).into_font().color(&WHITE));
        titled.draw(&pie)?;
        Ok(())
    }

    fn categorical_chart<'a, DB: DrawingBackend>(
        root: &'a DrawingArea<DB, Shift>,
        spec: &ChartSpec,
        count: usize,
        y_max: f64,
    ) -> Result<
        ChartContext<'a, DB, Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>>,
        DrawingAreaErrorKind<DB::ErrorType>,
    > {
        ChartBuilder::on(root)
            .caption(spec.title.as_str(), (FONT, 22).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..(count as f64 - 0.5), 0.0..Self::pad(y_max))
    }

    fn category_label(labels: &[String], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Headroom above the tallest value.
    fn pad(max: f64) -> f64 {
        if max <= 0.0 {
            1.0
        } else {
            max * 1.1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartSpec;
    use crate::data::{Month, SalesRecord, SalesTable};
    use crate::stats::{compute_report, ReportOutput, Selection};

    #[test]
    fn file_names_are_numbered_and_sanitized() {
        let mut spec = ChartSpec::for_report(&ReportOutput::Yearly(crate::stats::YearlyReport {
            year: 1980,
            yearly_overall_sales: vec![],
            monthly_sales: vec![],
            avg_sales_by_vehicle_type: vec![],
            ad_expenditure_by_vehicle_type: vec![],
        }))
        .remove(0);
        assert_eq!(StaticChartRenderer::file_name(0, &spec), "01_yearly_sales.png");
        spec.id = "a b/c".to_string();
        assert_eq!(StaticChartRenderer::file_name(9, &spec), "10_a_b_c.png");
    }

    #[test]
    fn category_labels_only_on_whole_positions() {
        let labels = vec!["Sports".to_string(), "SUV".to_string()];
        assert_eq!(StaticChartRenderer::category_label(&labels, 1.0), "SUV");
        assert_eq!(StaticChartRenderer::category_label(&labels, 0.5), "");
        assert_eq!(StaticChartRenderer::category_label(&labels, -1.0), "");
        assert_eq!(StaticChartRenderer::category_label(&labels, 2.0), "");
    }

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn sales_table() -> SalesTable {
        let row = |year, month, vehicle_type: &str, sales, expenditure, rate, recession| SalesRecord {
            year,
            month,
            vehicle_type: vehicle_type.to_string(),
            automobile_sales: sales,
            advertising_expenditure: expenditure,
            unemployment_rate: rate,
            recession,
        };
        SalesTable::new(vec![
            row(1980, Month::Jan, "Sports", 10.0, 100.0, 5.0, false),
            row(1980, Month::Feb, "Sports", 20.0, 100.0, 5.0, false),
            row(1980, Month::Jan, "SUV", 30.0, 200.0, 5.0, true),
            row(1981, Month::Mar, "Executivecar", 4.0, 70.0, 9.5, true),
            row(1981, Month::Mar, "Sports", 12.0, 30.0, 7.0, true),
        ])
    }

    #[test]
    fn exports_four_pngs_per_report() {
        let table = sales_table();
        let dir = std::env::temp_dir().join(format!("autosales_export_{}", std::process::id()));

        for (name, selection) in [("recession", Selection::Recession), ("yearly", Selection::Yearly(1980))] {
            let specs = ChartSpec::for_report(&compute_report(&table, selection));
            let out = dir.join(name);
            let paths = StaticChartRenderer::export_report(&specs, &out, 400, 300).unwrap();

            assert_eq!(paths.len(), 4);
            for (idx, (path, spec)) in paths.iter().zip(&specs).enumerate() {
                assert_eq!(*path, out.join(StaticChartRenderer::file_name(idx, spec)));
                assert!(path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&format!("{:02}_{}", idx + 1, spec.id))));
                let bytes = std::fs::read(path).unwrap();
                assert_eq!(bytes[..8], PNG_SIGNATURE);
            }
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn chart_without_data_still_renders() {
        let specs = ChartSpec::for_report(&compute_report(&SalesTable::default(), Selection::Yearly(1990)));
        let empty = specs.iter().find(|spec| spec.is_empty()).unwrap();
        let png = StaticChartRenderer::render_png(empty, 320, 240).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn padding_leaves_headroom() {
        assert_eq!(StaticChartRenderer::pad(0.0), 1.0);
        assert!((StaticChartRenderer::pad(100.0) - 110.0).abs() < 1e-9);
    }
}
