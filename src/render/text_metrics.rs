//! Text measurement for surfaces without a font engine.
//!
//! Widths are estimated from an average glyph advance. Good enough to size
//! label chips; real surfaces with font access should measure glyphs.

use crate::constants::LABEL_FONT_SIZE;

/// Metrics for a specific font/size combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Font size in pixels
    pub size: f32,
    /// Average character width as a ratio of font size
    pub char_width_ratio: f32,
}

impl TextMetrics {
    /// Ratio tuned for a monospace face.
    pub const MONO_RATIO: f32 = 0.6;

    /// Create metrics for a specific font size.
    pub fn new(size: f32) -> Self {
        Self {
            size,
            char_width_ratio: Self::MONO_RATIO,
        }
    }

    /// Metrics of the label font.
    pub fn label() -> Self {
        Self::new(LABEL_FONT_SIZE)
    }

    /// Estimate the width of a single line of text.
    pub fn line_width(&self, text: &str) -> f32 {
        let char_count = text.chars().count() as f32;
        char_count * self.size * self.char_width_ratio
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::label()
    }
}
