use eframe::egui::{Color32, Ui};
use egui_plot::{Corner, Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::state::ViewerState;

/// Point radius shared by every class series.
const POINT_RADIUS: f32 = 3.5;
/// Opacity of the scatter points.
const POINT_ALPHA: f32 = 0.75;

// ---------------------------------------------------------------------------
// Embedding scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render one scatter series per visible class. A click selects the
/// nearest visible sample.
pub fn embedding_plot(ui: &mut Ui, state: &mut ViewerState) {
    if state.result.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No samples to show");
        });
        return;
    }

    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("Embedding of all CP centers (colored by model prediction)");
    });

    let clicked = Plot::new("embedding_plot")
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label("Embedding dim 1")
        .y_axis_label("Embedding dim 2")
        .show_grid(true)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for label in state.result.labels() {
                if !state.is_visible(label) {
                    continue;
                }
                let points: PlotPoints = state
                    .result
                    .by_label(label)
                    .map(|s| [s.x, s.y])
                    .collect();

                let color = state.color_map.color_for(label).gamma_multiply(POINT_ALPHA);
                plot_ui.points(
                    Points::new(points)
                        .name(label.name())
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(POINT_RADIUS),
                );
            }

            if let Some(sample) = state.selected.map(|i| &state.result.samples[i]) {
                plot_ui.points(
                    Points::new(vec![[sample.x, sample.y]])
                        .color(Color32::BLACK)
                        .shape(MarkerShape::Circle)
                        .filled(false)
                        .radius(POINT_RADIUS * 2.0),
                );
            }

            if plot_ui.response().clicked() {
                plot_ui.pointer_coordinate()
            } else {
                None
            }
        })
        .inner;

    if let Some(point) = clicked {
        state.select_nearest(point.x, point.y);
    }
}
