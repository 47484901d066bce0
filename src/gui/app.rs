//! Chart Window Application
//! Native window with a chart list on the left and the viewer in the center.

use crate::charts::RenderedChart;
use crate::gui::ChartViewer;
use egui::{Key, RichText, SidePanel};
use thiserror::Error;

const WINDOW_TITLE: &str = "COVID-19 Analysis Charts";

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("No charts to display")]
    NoCharts,
    #[error("Chart window failed: {0}")]
    Window(String),
}

/// Main application window.
pub struct ChartWindowApp {
    viewer: ChartViewer,
}

impl ChartWindowApp {
    pub fn new(cc: &eframe::CreationContext<'_>, charts: &[RenderedChart]) -> Self {
        Self {
            viewer: ChartViewer::new(&cc.egui_ctx, charts),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (next, previous) = ctx.input(|i| {
            (
                i.key_pressed(Key::ArrowRight) || i.key_pressed(Key::ArrowDown),
                i.key_pressed(Key::ArrowLeft) || i.key_pressed(Key::ArrowUp),
            )
        });
        if next {
            self.viewer.next();
        }
        if previous {
            self.viewer.previous();
        }
    }
}

impl eframe::App for ChartWindowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        // Left panel - chart list
        SidePanel::left("chart_list")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Charts");
                ui.separator();

                let selected = self.viewer.selected();
                let mut clicked = None;
                for (idx, page) in self.viewer.pages().iter().enumerate() {
                    let label = RichText::new(format!("{}. {}", idx + 1, page.title));
                    if ui.selectable_label(idx == selected, label).clicked() {
                        clicked = Some(idx);
                    }
                }
                if let Some(idx) = clicked {
                    self.viewer.select(idx);
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("◀ Previous").clicked() {
                        self.viewer.previous();
                    }
                    if ui.button("Next ▶").clicked() {
                        self.viewer.next();
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ui);
        });
    }
}

/// Open the chart window and block until it is closed.
pub fn show_charts(charts: Vec<RenderedChart>) -> Result<(), ViewerError> {
    if charts.is_empty() {
        return Err(ViewerError::NoCharts);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(ChartWindowApp::new(cc, &charts)))),
    )
    .map_err(|e| ViewerError::Window(e.to_string()))
}
