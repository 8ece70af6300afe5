//! DataView - interactive chart builder for tabular data
//!
//! Desktop entry point: installs logging and opens the main window.

use dataview::gui::DataViewApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    let _ = dataview::telemetry::init_tracing();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("DataView"),
        ..Default::default()
    };

    eframe::run_native(
        "DataView",
        options,
        Box::new(|cc| Ok(Box::new(DataViewApp::new(cc)))),
    )
}
