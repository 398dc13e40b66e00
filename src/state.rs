use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::data::model::{ClassLabel, EmbeddingResult};
use crate::export::write_results;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the plot window shows, independent of rendering.
pub struct ViewerState {
    pub result: EmbeddingResult,

    /// Classes currently hidden from the plot.
    pub hidden: BTreeSet<ClassLabel>,

    pub color_map: ColorMap,

    /// Index into `result.samples` of the clicked sample.
    pub selected: Option<usize>,

    /// Where the run wrote its results; the export dialog starts here.
    pub output_path: PathBuf,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    pub fn new(result: EmbeddingResult, output_path: PathBuf) -> Self {
        Self {
            result,
            hidden: BTreeSet::new(),
            color_map: ColorMap::default(),
            selected: None,
            output_path,
            status_message: None,
        }
    }

    pub fn is_visible(&self, label: ClassLabel) -> bool {
        !self.hidden.contains(&label)
    }

    pub fn toggle_label(&mut self, label: ClassLabel) {
        if !self.hidden.remove(&label) {
            self.hidden.insert(label);
        }
        if let Some(i) = self.selected {
            if !self.is_visible(self.result.samples[i].record.label) {
                self.selected = None;
            }
        }
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn hide_all(&mut self) {
        self.hidden = ClassLabel::ALL.into_iter().collect();
        self.selected = None;
    }

    pub fn visible_count(&self) -> usize {
        self.result
            .samples
            .iter()
            .filter(|s| self.is_visible(s.record.label))
            .count()
    }

    /// Select the visible sample closest to a plot coordinate.
    pub fn select_nearest(&mut self, x: f64, y: f64) {
        self.selected = self
            .result
            .samples
            .iter()
            .enumerate()
            .filter(|(_, s)| self.is_visible(s.record.label))
            .map(|(i, s)| (i, (s.x - x).powi(2) + (s.y - y).powi(2)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
    }

    /// Write the full result (hidden classes included) to another file.
    pub fn export_to(&mut self, path: &Path) {
        match write_results(&self.result, path) {
            Ok(()) => {
                self.status_message = Some(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
