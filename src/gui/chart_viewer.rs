//! Chart Viewer Widget
//! Central panel showing one rendered chart at a time, scaled to the
//! available width.

use crate::charts::RenderedChart;
use egui::load::SizedTexture;
use egui::{Color32, ColorImage, RichText, ScrollArea, TextureHandle, TextureOptions};

const CARD_MARGIN: f32 = 12.0;
const BORDER_COLOR: Color32 = Color32::from_rgb(52, 152, 219);

/// One chart uploaded to the GPU.
pub struct ChartPage {
    pub title: String,
    pub file: String,
    texture: TextureHandle,
}

/// Pages through the rendered charts in rendering order.
#[derive(Default)]
pub struct ChartViewer {
    pages: Vec<ChartPage>,
    selected: usize,
}

impl ChartViewer {
    /// Upload every chart image as a texture.
    pub fn new(ctx: &egui::Context, charts: &[RenderedChart]) -> Self {
        let pages = charts
            .iter()
            .map(|chart| {
                let size = [chart.image.width() as usize, chart.image.height() as usize];
                let image = ColorImage::from_rgb(size, chart.image.as_raw());
                ChartPage {
                    title: chart.title.clone(),
                    file: chart.path.display().to_string(),
                    texture: ctx.load_texture(
                        chart.kind.file_name(),
                        image,
                        TextureOptions::LINEAR,
                    ),
                }
            })
            .collect();

        Self { pages, selected: 0 }
    }

    pub fn pages(&self) -> &[ChartPage] {
        &self.pages
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, idx: usize) {
        if idx < self.pages.len() {
            self.selected = idx;
        }
    }

    pub fn next(&mut self) {
        self.select(self.selected + 1);
    }

    pub fn previous(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    /// Draw the selected chart inside a bordered card.
    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(page) = self.pages.get(self.selected) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Charts").size(20.0));
            });
            return;
        };

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, BORDER_COLOR))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(CARD_MARGIN)
            .show(ui, |ui| {
                ui.label(RichText::new(&page.title).size(18.0).strong());
                ui.label(RichText::new(&page.file).size(12.0).weak());
                ui.add_space(8.0);

                let size = page.texture.size_vec2();
                let scale = (ui.available_width() / size.x).clamp(0.1, 1.0);

                ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                    ui.image(SizedTexture::new(page.texture.id(), size * scale));
                });
            });
    }
}
