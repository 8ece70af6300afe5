//! Control Panel Widget
//! Left side panel: file upload, chart kind, axis columns and the Generate button.

use crate::charts::{AxisChoices, ChartKind, ChartRequest};
use crate::session::Feedback;
use egui::{Color32, ComboBox, RichText};

const WARNING_COLOR: Color32 = Color32::from_rgb(255, 193, 7);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const OK_COLOR: Color32 = Color32::from_rgb(40, 167, 69);

/// Left side control panel with file selection and chart options.
pub struct ControlPanel {
    pub file_name: Option<String>,
    pub columns: Vec<String>,
    pub kind: ChartKind,
    pub x_col: String,
    pub y_col: String,
    pub status: String,
    status_color: Color32,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            file_name: None,
            columns: Vec::new(),
            kind: ChartKind::Bar,
            x_col: String::new(),
            y_col: String::new(),
            status: "Upload a CSV or Excel file to begin".to_string(),
            status_color: Color32::GRAY,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the columns of a freshly loaded dataset; both selectors start on
    /// the first column.
    pub fn update_columns(&mut self, file_name: &str, columns: Vec<String>) {
        self.file_name = Some(file_name.to_string());
        self.x_col = columns.first().cloned().unwrap_or_default();
        self.y_col = self.x_col.clone();
        self.columns = columns;
    }

    pub fn clear_columns(&mut self) {
        self.columns.clear();
        self.x_col.clear();
        self.y_col.clear();
    }

    /// The request the current selections describe, if an X column is chosen.
    pub fn request(&self) -> Option<ChartRequest> {
        if self.x_col.is_empty() {
            return None;
        }
        let y = (!self.y_col.is_empty()).then(|| self.y_col.clone());
        Some(ChartRequest::new(self.kind, self.x_col.clone(), y))
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.status_color = OK_COLOR;
    }

    pub fn set_feedback(&mut self, feedback: &Feedback) {
        self.status = feedback.message().to_string();
        self.status_color = match feedback {
            Feedback::Warning(_) => WARNING_COLOR,
            Feedback::Error(_) => ERROR_COLOR,
        };
    }

    fn column_selector(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        selected: &mut String,
        columns: &[String],
    ) {
        ui.horizontal(|ui| {
            ui.add_sized([110.0, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(170.0)
                .selected_text(selected.as_str())
                .show_ui(ui, |ui| {
                    for col in columns {
                        ui.selectable_value(selected, col.clone(), col.as_str());
                    }
                });
        });
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 DataView")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Interactive Data Visualization")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Upload =====
        ui.label(RichText::new("📁 Upload your dataset").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let name = self
                        .file_name
                        .as_deref()
                        .unwrap_or("No file selected (CSV or Excel)");
                    ui.label(RichText::new(name).size(12.0).color(
                        if self.file_name.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart options =====
        ui.label(RichText::new("🔧 Chart Options").size(14.0).strong());
        ui.add_space(8.0);

        ui.add_enabled_ui(!self.columns.is_empty(), |ui| {
            ui.horizontal(|ui| {
                ui.add_sized([110.0, 20.0], egui::Label::new("Chart type:"));
                ComboBox::from_id_salt("chart_kind")
                    .width(170.0)
                    .selected_text(self.kind.label())
                    .show_ui(ui, |ui| {
                        for kind in ChartKind::ALL {
                            ui.selectable_value(&mut self.kind, kind, kind.label());
                        }
                    });
            });
            ui.add_space(5.0);

            let choices = AxisChoices::for_kind(&self.columns, self.kind);
            Self::column_selector(ui, "x_col", "X-axis column:", &mut self.x_col, &choices.x);
            if let Some(y_columns) = &choices.y {
                ui.add_space(5.0);
                Self::column_selector(ui, "y_col", "Y-axis column:", &mut self.y_col, y_columns);
            }

            ui.add_space(15.0);
            ui.vertical_centered(|ui| {
                let button = egui::Button::new(RichText::new("▶ Generate Chart").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Generate;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.label(RichText::new(&self.status).size(12.0).color(self.status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    Generate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_default_to_first_column() {
        let mut panel = ControlPanel::new();
        assert_eq!(panel.request(), None);
        panel.update_columns("a.csv", vec!["city".into(), "temp".into()]);
        let request = panel.request().unwrap();
        assert_eq!(request.x, "city");
        assert_eq!(request.y.as_deref(), Some("city"));
    }

    #[test]
    fn single_axis_kinds_drop_the_y_selection() {
        let mut panel = ControlPanel::new();
        panel.update_columns("a.csv", vec!["temp".into()]);
        panel.kind = ChartKind::Histogram;
        assert_eq!(panel.request().unwrap().y, None);
    }

    #[test]
    fn feedback_sets_status_text() {
        let mut panel = ControlPanel::new();
        panel.set_feedback(&Feedback::Error("Error: bad".into()));
        assert_eq!(panel.status, "Error: bad");
    }
}
