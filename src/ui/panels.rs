use eframe::egui::{self, Color32, Grid, RichText, ScrollArea, Ui};

use crate::data::model::Record;
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – prediction legend and selection details
// ---------------------------------------------------------------------------

/// Render the left panel: class toggles with counts, then the clicked sample.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Prediction");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.show_all();
        }
        if ui.small_button("None").clicked() {
            state.hide_all();
        }
    });

    let counts: Vec<_> = state
        .result
        .labels()
        .into_iter()
        .map(|label| (label, state.result.by_label(label).count()))
        .collect();

    for (label, count) in counts {
        let text = RichText::new(format!("{label}  ({count})"))
            .color(state.color_map.color_for(label));
        let mut checked = state.is_visible(label);
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_label(label);
        }
    }

    ui.add_space(8.0);
    ui.heading("Selected sample");
    ui.separator();

    let Some(sample) = state.selected.map(|i| &state.result.samples[i]) else {
        ui.label("Click a point to inspect it.");
        return;
    };

    Grid::new("selected_sample").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("subject");
        ui.label(sample.record.subject.as_str());
        ui.end_row();
        ui.label("idx_center");
        ui.label(sample.record.center_index.to_string());
        ui.end_row();
        ui.label("label");
        ui.label(sample.record.label.name());
        ui.end_row();
        ui.label("x, y");
        ui.label(format!("{:.3}, {:.3}", sample.x, sample.y));
        ui.end_row();
    });

    egui::CollapsingHeader::new(RichText::new("Features").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    Grid::new("selected_features")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui: &mut Ui| {
                            for (i, value) in sample.record.features.iter().enumerate() {
                                ui.label(Record::feature_name(i));
                                ui.label(format!("{value:.4}"));
                                ui.end_row();
                            }
                        });
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} samples, {} visible",
            state.result.len(),
            state.visible_count()
        ));

        ui.separator();
        ui.label(format!("Output: {}", state.output_path.display()));

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut ViewerState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Export coordinates")
        .add_filter("Parquet", &["parquet"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"]);
    if let Some(dir) = state.output_path.parent() {
        dialog = dialog.set_directory(dir);
    }
    if let Some(name) = state.output_path.file_name().and_then(|n| n.to_str()) {
        dialog = dialog.set_file_name(name);
    }

    if let Some(path) = dialog.save_file() {
        state.export_to(&path);
    }
}
