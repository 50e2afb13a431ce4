//! Text measurement.
//!
//! The layout engine never shapes glyphs itself. Hosts supply a
//! [`TextMeasure`], usually backed by their font stack; any
//! `Fn(&str, &FontProperties) -> TextSize` closure qualifies.

use trellis_style::ResolvedStyle;

/// Font properties handed to the measurement callback.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProperties {
    pub family: String,
    /// Font size in layout units
    pub size: f64,
    /// Font weight (100-900, normal=400, bold=700)
    pub weight: f64,
    /// Line height as a multiplier of `size`
    pub line_height: f64,
}

impl Default for FontProperties {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 16.0,
            weight: 400.0,
            line_height: 1.2,
        }
    }
}

impl FontProperties {
    pub fn from_style(style: &ResolvedStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            weight: style.font_weight,
            line_height: style.line_height,
        }
    }
}

/// Measured extent of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

impl TextSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Text measurement capability supplied by the host.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &FontProperties) -> TextSize;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, &FontProperties) -> TextSize,
{
    fn measure(&self, text: &str, font: &FontProperties) -> TextSize {
        self(text, font)
    }
}

/// Character-count estimate for hosts without font metrics.
///
/// Each character is `char_width` ems wide; a line is `line_height` ems
/// tall. Newlines start new lines.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedTextMeasure {
    pub char_width: f64,
}

impl Default for EstimatedTextMeasure {
    fn default() -> Self {
        Self { char_width: 0.5 }
    }
}

impl TextMeasure for EstimatedTextMeasure {
    fn measure(&self, text: &str, font: &FontProperties) -> TextSize {
        let line_height = font.size * font.line_height;
        if text.is_empty() {
            return TextSize::new(0.0, line_height);
        }

        let advance = font.size * self.char_width;
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in text.split('\n') {
            lines += 1;
            widest = widest.max(line.chars().count());
        }

        TextSize::new(widest as f64 * advance, lines as f64 * line_height)
    }
}
