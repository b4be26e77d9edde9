//! Control Panel Widget
//! Left side panel with the statistics and year selectors.

use crate::gui::DASHBOARD_HEADING;
use crate::stats::{ReportMode, Selection, MAX_YEAR, MIN_YEAR};
use egui::{Color32, ComboBox, RichText};

/// Left side control panel with report selection and export controls.
pub struct ControlPanel {
    pub mode: ReportMode,
    pub year: i32,
    pub row_count: usize,
    pub status: String,
    pub is_error: bool,
    pub data_ready: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            mode: ReportMode::Yearly,
            year: MIN_YEAR,
            row_count: 0,
            status: "Ready".to_string(),
            is_error: false,
            data_ready: false,
        }
    }
}

impl ControlPanel {
    pub fn new(mode: ReportMode, year: i32) -> Self {
        Self {
            mode,
            year,
            ..Self::default()
        }
    }

    /// Current selector values as a report selection.
    pub fn selection(&self) -> Selection {
        Selection::from_inputs(self.mode, self.year)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new(DASHBOARD_HEADING)
                    .size(20.0)
                    .color(Color32::from_rgb(80, 61, 54)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let label_width = 110.0;
        let combo_width = 200.0;

        // ===== Statistics selector =====
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(RichText::new("Select Statistics:").strong()));
            ComboBox::from_id_salt("dropdown_statistics")
                .width(combo_width)
                .selected_text(self.mode.label())
                .show_ui(ui, |ui| {
                    for mode in ReportMode::ALL {
                        if ui.selectable_value(&mut self.mode, mode, mode.label()).changed() {
                            action = ControlPanelAction::SelectionChanged;
                        }
                    }
                });
        });

        ui.add_space(8.0);

        // ===== Year selector, only meaningful for yearly statistics =====
        if self.mode == ReportMode::Yearly {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new(RichText::new("Select Year:").strong()));
                ComboBox::from_id_salt("select_year")
                    .width(combo_width)
                    .selected_text(self.year.to_string())
                    .height(300.0)
                    .show_ui(ui, |ui| {
                        for year in MIN_YEAR..=MAX_YEAR {
                            if ui.selectable_value(&mut self.year, year, year.to_string()).changed() {
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.label(RichText::new("Export").size(14.0).strong());
        ui.add_space(5.0);
        ui.add_enabled_ui(self.data_ready, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Export PNG").clicked() {
                    action = ControlPanelAction::ExportPng;
                }
                if ui.button("Save JSON").clicked() {
                    action = ControlPanelAction::SaveJson;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        if self.data_ready {
            ui.label(
                RichText::new(format!("{} rows loaded", self.row_count))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }
        let status_color = if self.is_error {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = false;
    }

    pub fn set_error(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = true;
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    SelectionChanged,
    ExportPng,
    SaveJson,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_ignored_in_recession_mode() {
        let mut panel = ControlPanel::new(ReportMode::Recession, 1990);
        assert_eq!(panel.selection(), Selection::Recession);
        panel.year = 2005;
        assert_eq!(panel.selection(), Selection::Recession);

        panel.mode = ReportMode::Yearly;
        assert_eq!(panel.selection(), Selection::Yearly(2005));
    }
}
