//! Chart Viewer Widget
//! Right side scrollable panel: dataset preview, the latest chart with its
//! download buttons, and the session history.

use crate::charts::{ChartRenderer, RenderSettings};
use crate::data::Preview;
use crate::export::ExportFormat;
use crate::session::{History, RenderedChart};
use egui::{Color32, RichText, ScrollArea, TextureHandle};
use std::collections::HashMap;

const SECTION_SPACING: f32 = 15.0;
const THUMBNAIL_WIDTH: f32 = 500.0;

/// Which raster of a chart a texture holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Size {
    Full,
    Thumbnail,
}

/// Actions triggered by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    None,
    Download { chart: usize, format: ExportFormat },
}

/// Scrollable chart display area. Charts are rasterized once and cached as
/// textures keyed by their history number.
#[derive(Default)]
pub struct ChartViewer {
    preview: Option<Preview>,
    textures: HashMap<(usize, Size), Result<TextureHandle, String>>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_preview(&mut self, preview: Option<Preview>) {
        self.preview = preview;
    }

    fn texture(
        &mut self,
        ctx: &egui::Context,
        chart: &RenderedChart,
        size: Size,
        settings: &RenderSettings,
    ) -> &Result<TextureHandle, String> {
        self.textures.entry((chart.number, size)).or_insert_with(|| {
            let settings = match size {
                Size::Full => *settings,
                Size::Thumbnail => RenderSettings::thumbnail(),
            };
            ChartRenderer::render_rgb(&chart.figure, &settings)
                .map(|rgb| {
                    let image = egui::ColorImage::from_rgb(
                        [settings.width as usize, settings.height as usize],
                        &rgb,
                    );
                    ctx.load_texture(
                        format!("chart-{}-{:?}", chart.number, size),
                        image,
                        egui::TextureOptions::LINEAR,
                    )
                })
                .map_err(|e| e.to_string())
        })
    }

    fn show_chart(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        chart: &RenderedChart,
        size: Size,
        settings: &RenderSettings,
    ) {
        match self.texture(ctx, chart, size, settings) {
            Ok(texture) => {
                let max_width = match size {
                    Size::Full => ui.available_width(),
                    Size::Thumbnail => THUMBNAIL_WIDTH.min(ui.available_width()),
                };
                ui.add(
                    egui::Image::new(egui::load::SizedTexture::new(
                        texture.id(),
                        texture.size_vec2(),
                    ))
                    .max_width(max_width),
                );
            }
            Err(err) => {
                ui.label(
                    RichText::new(format!("Error: {}", err))
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            }
        }
    }

    fn show_preview(ui: &mut egui::Ui, preview: &Preview) {
        ui.label(RichText::new("Dataset Preview").size(18.0).strong());
        ui.add_space(5.0);
        ScrollArea::horizontal().id_salt("preview").show(ui, |ui| {
            egui::Grid::new("preview_grid")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for col in &preview.columns {
                        ui.label(RichText::new(col).strong());
                    }
                    ui.end_row();
                    for row in &preview.rows {
                        for cell in row {
                            ui.label(cell.as_str());
                        }
                        ui.end_row();
                    }
                });
        });
    }

    /// Draw the viewer
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        history: &History,
        settings: &RenderSettings,
    ) -> ViewerAction {
        let mut action = ViewerAction::None;

        if self.preview.is_none() && history.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return action;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if let Some(preview) = &self.preview {
                    Self::show_preview(ui, preview);
                    ui.add_space(SECTION_SPACING);
                    ui.separator();
                }

                let Some(latest) = history.latest() else {
                    return;
                };

                self.show_chart(ctx, ui, latest, Size::Full, settings);
                ui.add_space(8.0);
                ui.label(RichText::new("Download the chart").size(16.0).strong());
                ui.horizontal(|ui| {
                    for format in ExportFormat::ALL {
                        if ui.button(format!("Download as {}", format)).clicked() {
                            action = ViewerAction::Download {
                                chart: latest.number,
                                format,
                            };
                        }
                    }
                });

                ui.add_space(SECTION_SPACING);
                ui.separator();
                ui.label(
                    RichText::new("Previously Generated Charts")
                        .size(18.0)
                        .strong(),
                );
                for chart in history.entries() {
                    ui.add_space(8.0);
                    ui.label(RichText::new(chart.heading()).size(14.0));
                    self.show_chart(ctx, ui, chart, Size::Thumbnail, settings);
                }
            });

        action
    }
}
