//! Chart Plotter Module
//! Draws chart specs interactively using egui_plot.

use crate::charts::{ChartBody, ChartKind, ChartPoint, ChartSpec};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points, Polygon, Text};
use std::f64::consts::TAU;
use std::ops::RangeInclusive;

pub const LINE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const BAR_WIDTH: f64 = 0.6;
const PIE_SEGMENTS: usize = 96;

/// Renders `ChartSpec`s into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn palette_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw any chart spec at the given plot height.
    pub fn draw_chart(ui: &mut egui::Ui, spec: &ChartSpec, height: f32) {
        if spec.is_empty() {
            ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No data for this selection").color(Color32::GRAY));
                });
            });
            return;
        }

        match (&spec.kind, &spec.body) {
            (ChartKind::Line, ChartBody::Points(points)) => {
                Self::draw_line_chart(ui, spec, points, height)
            }
            (ChartKind::Bar, ChartBody::Points(points)) => {
                Self::draw_bar_chart(ui, spec, points, height)
            }
            (ChartKind::Pie, ChartBody::Points(points)) => {
                Self::draw_pie_chart(ui, spec, points, height)
            }
            (ChartKind::StackedBar, ChartBody::Stacked { categories, series }) => {
                Plot::new(format!("stacked_{}", spec.id))
                    .height(height)
                    .allow_scroll(false)
                    .x_axis_label(spec.x_label.clone())
                    .y_axis_label(spec.y_label.clone())
                    .include_y(0.0)
                    .x_axis_formatter(Self::category_formatter(categories.clone()))
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        let mut bases = vec![0.0; categories.len()];
                        for (s_idx, segment) in series.iter().enumerate() {
                            let color = Self::palette_color(s_idx);
                            let bars: Vec<Bar> = segment
                                .values
                                .iter()
                                .enumerate()
                                .filter_map(|(i, v)| v.map(|v| (i, v)))
                                .map(|(i, v)| {
                                    let bar = Bar::new(i as f64, v)
                                        .width(BAR_WIDTH)
                                        .base_offset(bases[i])
                                        .fill(color);
                                    bases[i] += v;
                                    bar
                                })
                                .collect();
                            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&segment.name));
                        }
                    });
            }
            _ => {
                ui.label(RichText::new("Unsupported chart layout").color(Color32::GRAY));
            }
        }
    }

    fn draw_line_chart(ui: &mut egui::Ui, spec: &ChartSpec, points: &[ChartPoint], height: f32) {
        let labels: Vec<(f64, String)> = points.iter().map(|p| (p.x, p.label.clone())).collect();

        Plot::new(format!("line_{}", spec.id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                labels
                    .iter()
                    .find(|(x, _)| (x - mark.value).abs() < 1e-6)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                let series: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(series.iter().copied()))
                        .color(LINE_COLOR)
                        .width(2.0)
                        .name(&spec.y_label),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(series.iter().copied()))
                        .radius(3.0)
                        .color(LINE_COLOR),
                );
            });
    }

    fn draw_bar_chart(ui: &mut egui::Ui, spec: &ChartSpec, points: &[ChartPoint], height: f32) {
        Plot::new(format!("bar_{}", spec.id))
            .height(height)
            .allow_scroll(false)
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .include_y(0.0)
            .x_axis_formatter(Self::category_formatter(spec.categories()))
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = points
                    .iter()
                    .map(|p| {
                        Bar::new(p.x, p.y)
                            .width(BAR_WIDTH)
                            .name(&p.label)
                            .fill(LINE_COLOR)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(LINE_COLOR).name(&spec.y_label));
            });
    }

    /// Slices as filled polygons on an equal-aspect plot with hidden axes.
    fn draw_pie_chart(ui: &mut egui::Ui, spec: &ChartSpec, points: &[ChartPoint], height: f32) {
        let total: f64 = points.iter().map(|p| p.y.max(0.0)).sum();

        Plot::new(format!("pie_{}", spec.id))
            .height(height)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                if total <= 0.0 {
                    return;
                }
                for (idx, (start, end)) in Self::slice_angles(points).into_iter().enumerate() {
                    let color = Self::palette_color(idx);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(Self::wedge(start, end)))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(egui::Stroke::new(1.0, Color32::WHITE))
                            .name(&points[idx].label),
                    );

                    let mid = (start + end) / 2.0;
                    let share = points[idx].y.max(0.0) / total * 100.0;
                    plot_ui.text(Text::new(
                        [0.65 * mid.cos(), 0.65 * mid.sin()].into(),
                        RichText::new(format!("{:.1}%", share)).color(Color32::WHITE).strong(),
                    ));
                }
            });
    }

    /// Start/end angle of each slice, counter-clockwise from 12 o'clock.
    pub fn slice_angles(points: &[ChartPoint]) -> Vec<(f64, f64)> {
        let total: f64 = points.iter().map(|p| p.y.max(0.0)).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        let mut start = TAU / 4.0;
        points
            .iter()
            .map(|p| {
                let sweep = p.y.max(0.0) / total * TAU;
                let slice = (start, start + sweep);
                start += sweep;
                slice
            })
            .collect()
    }

    fn wedge(start: f64, end: f64) -> Vec<[f64; 2]> {
        let steps = ((end - start) / TAU * PIE_SEGMENTS as f64).ceil().max(1.0) as usize;
        let mut vertices = Vec::with_capacity(steps + 2);
        vertices.push([0.0, 0.0]);
        for i in 0..=steps {
            let angle = start + (end - start) * i as f64 / steps as f64;
            vertices.push([angle.cos(), angle.sin()]);
        }
        vertices
    }

    /// X axis labels for category names placed at 0, 1, 2, ...
    fn category_formatter(
        categories: Vec<String>,
    ) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
        move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            categories.get(idx as usize).cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, y: f64) -> ChartPoint {
        ChartPoint {
            label: label.to_string(),
            x: 0.0,
            y,
        }
    }

    #[test]
    fn slices_cover_full_circle_proportionally() {
        let slices = ChartPlotter::slice_angles(&[point("a", 1.0), point("b", 3.0)]);
        assert_eq!(slices.len(), 2);
        let sweep_a = slices[0].1 - slices[0].0;
        let sweep_b = slices[1].1 - slices[1].0;
        assert!((sweep_a - TAU / 4.0).abs() < 1e-9);
        assert!((sweep_b - 3.0 * TAU / 4.0).abs() < 1e-9);
        assert!((slices[1].0 - slices[0].1).abs() < 1e-12);
    }

    #[test]
    fn zero_total_has_no_slices() {
        assert!(ChartPlotter::slice_angles(&[point("a", 0.0)]).is_empty());
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(ChartPlotter::palette_color(0), ChartPlotter::palette_color(PALETTE.len()));
    }
}
