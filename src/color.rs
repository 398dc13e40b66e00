use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::ClassLabel;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: predicted class → Color32
// ---------------------------------------------------------------------------

/// One colour per class, assigned by class index so a class keeps its colour
/// no matter which other classes are present.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<ClassLabel, Color32>,
}

impl Default for ColorMap {
    fn default() -> Self {
        let palette = generate_palette(ClassLabel::ALL.len());
        ColorMap {
            mapping: ClassLabel::ALL.into_iter().zip(palette).collect(),
        }
    }
}

impl ColorMap {
    pub fn color_for(&self, label: ClassLabel) -> Color32 {
        self.mapping.get(&label).copied().unwrap_or(Color32::GRAY)
    }
}
