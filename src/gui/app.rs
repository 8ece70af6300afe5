//! DataView Main Application
//! Main window with control panel and chart viewer. Every button press runs
//! one session action to completion before the next frame.

use crate::data::{UploadedFile, PREVIEW_ROWS};
use crate::export::ExportFormat;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, ViewerAction};
use crate::session::{Feedback, Session};
use anyhow::Context as _;
use egui::SidePanel;
use std::path::Path;
use tracing::warn;

/// Main application window.
pub struct DataViewApp {
    session: Session,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl DataViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: Session::default(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
        }
    }

    fn read_upload(path: &Path) -> anyhow::Result<UploadedFile> {
        let bytes =
            std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(UploadedFile::new(name, bytes))
    }

    /// Handle file selection
    fn handle_browse_file(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Data Files", &["csv", "xlsx", "xls"])
            .pick_file()
        else {
            return;
        };

        let file = match Self::read_upload(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "upload could not be read");
                self.control_panel
                    .set_feedback(&Feedback::Error(format!("Error: {:#}", e)));
                return;
            }
        };

        match self.session.upload(&file) {
            Ok(dataset) => {
                let status = format!(
                    "Loaded {} rows, {} columns",
                    dataset.row_count(),
                    dataset.columns().len()
                );
                let preview = dataset.preview(PREVIEW_ROWS).ok();
                self.control_panel
                    .update_columns(&file.name, dataset.columns());
                self.control_panel.set_status(&status);
                self.chart_viewer.set_preview(preview);
            }
            Err(err) => {
                self.control_panel.file_name = Some(file.name.clone());
                self.control_panel.clear_columns();
                self.control_panel.set_feedback(&err.feedback());
                self.chart_viewer.set_preview(None);
            }
        }
    }

    fn handle_generate(&mut self) {
        let Some(request) = self.control_panel.request() else {
            return;
        };
        match self.session.generate(request) {
            Ok(chart) => {
                let status = format!("{} ready", chart.heading());
                self.control_panel.set_status(&status);
            }
            Err(err) => self.control_panel.set_feedback(&err.feedback()),
        }
    }

    fn save_download(&mut self, chart: usize, format: ExportFormat) -> anyhow::Result<bool> {
        let download = self.session.export(chart, format)?;
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.to_string(), &[format.extension()])
            .set_file_name(download.file_name.as_str())
            .save_file()
        else {
            return Ok(false);
        };
        download
            .save_to(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(true)
    }

    /// Handle a download button
    fn handle_download(&mut self, chart: usize, format: ExportFormat) {
        match self.save_download(chart, format) {
            Ok(true) => self
                .control_panel
                .set_status(&format!("Chart {} saved as {}", chart, format)),
            Ok(false) => {}
            Err(e) => self
                .control_panel
                .set_feedback(&Feedback::Error(format!("Error: {:#}", e))),
        }
    }
}

impl eframe::App for DataViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::Generate => self.handle_generate(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let action = self.chart_viewer.show(
                ctx,
                ui,
                self.session.history(),
                self.session.settings(),
            );
            if let ViewerAction::Download { chart, format } = action {
                self.handle_download(chart, format);
            }
        });
    }
}
