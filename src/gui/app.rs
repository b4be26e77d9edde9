//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ChartSpec, StaticChartRenderer};
use crate::config::DashboardConfig;
use crate::data::{DataLoader, DataSource, SalesTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{compute_report, ReportOutput};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

/// Native window title, also used as the eframe app name.
pub const WINDOW_TITLE: &str = "Automobile Statistics Dashboard";
/// Heading drawn at the top of the control panel.
pub const DASHBOARD_HEADING: &str = "Automobile Sales Statistics Dashboard";

/// Dataset loading result from background thread
enum LoadResult {
    Complete(SalesTable),
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    table: Option<Arc<SalesTable>>,
    report: ReportOutput,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let control_panel = ControlPanel::new(config.default_mode, config.default_year);
        let mut app = Self {
            config,
            table: None,
            report: ReportOutput::Empty,
            control_panel,
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load the dataset once, off the UI thread.
    fn start_loading(&mut self) {
        let source = DataSource::parse(&self.config.data_source);
        self.control_panel
            .set_status(&format!("Loading dataset from {}...", source));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match DataLoader::new(source).load() {
                Ok(table) => LoadResult::Complete(table),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(table)) => {
                self.control_panel.row_count = table.len();
                self.control_panel.data_ready = true;
                self.control_panel.set_status("Dataset loaded");
                self.table = Some(Arc::new(table));
                self.is_loading = false;
                self.refresh();
            }
            Ok(LoadResult::Error(message)) => {
                error!(%message, "dataset load failed");
                self.control_panel.set_error(&format!("Error: {}", message));
                self.is_loading = false;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.set_error("Error: loader thread stopped unexpectedly");
                self.is_loading = false;
            }
        }
    }

    /// Recompute the report for the current selectors and replace the charts.
    fn refresh(&mut self) {
        let Some(table) = &self.table else {
            self.chart_viewer.clear();
            return;
        };

        let selection = self.control_panel.selection();
        self.report = compute_report(table, selection);
        let charts = ChartSpec::for_report(&self.report);
        info!(%selection, charts = charts.len(), "selection applied");
        self.chart_viewer.set_charts(charts);
    }

    /// Handle PNG export - render the current charts into a chosen folder
    fn handle_export_png(&mut self) {
        if self.chart_viewer.charts.is_empty() {
            self.control_panel.set_status("No charts to export");
            return;
        }

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return;
        };

        match StaticChartRenderer::export_report(
            &self.chart_viewer.charts,
            &dir,
            self.config.chart_width,
            self.config.chart_height,
        ) {
            Ok(paths) => self
                .control_panel
                .set_status(&format!("Exported {} charts to {}", paths.len(), dir.display())),
            Err(e) => {
                warn!(error = %e, "png export failed");
                self.control_panel.set_error(&format!("Export error: {}", e));
            }
        }
    }

    /// Save the current report tables as JSON
    fn handle_save_json(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("automobile_report.json")
            .save_file()
        else {
            return;
        };

        let result = serde_json::to_string_pretty(&self.report)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Report saved to {}", path.display())),
            Err(e) => {
                warn!(error = %e, "json export failed");
                self.control_panel.set_error(&format!("Save error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(320.0)
            .max_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::SelectionChanged => self.refresh(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::SaveJson => self.handle_save_json(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
