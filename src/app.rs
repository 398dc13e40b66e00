use std::path::PathBuf;

use eframe::egui;

use crate::data::model::EmbeddingResult;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EmbeddingViewerApp {
    pub state: ViewerState,
}

impl EmbeddingViewerApp {
    pub fn new(result: EmbeddingResult, output_path: PathBuf) -> Self {
        Self {
            state: ViewerState::new(result, output_path),
        }
    }
}

impl eframe::App for EmbeddingViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: legend + selection ----
        egui::SidePanel::left("prediction_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::embedding_plot(ui, &mut self.state);
        });
    }
}

/// Open the plot window and block until it is closed.
pub fn show(result: EmbeddingResult, output_path: PathBuf) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CP-center embedding",
        options,
        Box::new(move |_cc| Ok(Box::new(EmbeddingViewerApp::new(result, output_path)))),
    )
}
