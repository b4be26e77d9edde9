//! Chart Viewer Widget
//! Central scrollable panel showing the current report's charts in a two-column grid.

use crate::charts::{ChartPlotter, ChartSpec};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const PLOT_HEIGHT: f32 = 320.0;
const COLUMNS: usize = 2;

/// Holds the chart specs of the most recent selection.
#[derive(Default)]
pub struct ChartViewer {
    pub charts: Vec<ChartSpec>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    /// Replace all charts with those of a new selection.
    pub fn set_charts(&mut self, charts: Vec<ChartSpec>) {
        self.charts = charts;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if self.charts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        let avail_width = ui.available_width();
        let card_width = ((avail_width - CHART_SPACING * (COLUMNS as f32 + 1.0)) / COLUMNS as f32).max(300.0);

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for row in self.charts.chunks(COLUMNS) {
                    ui.horizontal(|ui| {
                        for spec in row {
                            Self::draw_chart_card(ui, spec, card_width);
                            ui.add_space(CHART_SPACING);
                        }
                    });
                    ui.add_space(CHART_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, spec: &ChartSpec, card_width: f32) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(180)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(card_width - 24.0);
                ui.vertical(|ui| {
                    ui.label(RichText::new(&spec.title).size(15.0).strong());
                    if let Some(legend) = &spec.legend_title {
                        ui.label(RichText::new(legend).size(11.0).color(Color32::GRAY));
                    }
                    ui.add_space(6.0);
                    ChartPlotter::draw_chart(ui, spec, PLOT_HEIGHT);
                });
            });
    }
}
