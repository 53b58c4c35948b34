use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

/// Histogram bar colour (emerald).
pub const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(0x13, 0x6F, 0x63);

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

// ---------------------------------------------------------------------------
// Continuous scale: price level → Color32
// ---------------------------------------------------------------------------

/// Cold-to-hot scale for map markers: 0 is blue (cheap), 1 is red (dear).
pub fn price_color(level: f64) -> Color32 {
    let t = level.clamp(0.0, 1.0) as f32;
    hsl_to_color32(240.0 * (1.0 - t), 0.8, 0.5)
}

// ---------------------------------------------------------------------------
// Categorical mapping: room type → Color32
// ---------------------------------------------------------------------------

/// Maps every category of a column to a stable, distinct colour.
/// Built from the full dataset so colours do not shift while filtering.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new(categories: &BTreeSet<String>) -> Self {
        let mapping = categories
            .iter()
            .cloned()
            .zip(generate_palette(categories.len()))
            .collect();
        CategoryColors { mapping }
    }

    /// Look up the colour for a category; unknown values are grey.
    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping.get(category).copied().unwrap_or(Color32::GRAY)
    }
}
