//! # Fonts
//!
//! Exported text is set in the standard Helvetica faces, which every PDF
//! reader provides, so nothing is embedded. Only their metrics are needed,
//! to measure strings for wrapping and alignment.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts pagegrid writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_weight(bold: bool) -> Self {
        if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// The PDF BaseFont name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> StandardFontMetrics {
        match self {
            StandardFont::Helvetica => StandardFontMetrics::HELVETICA,
            StandardFont::HelveticaBold => StandardFontMetrics::HELVETICA_BOLD,
        }
    }

    /// Width of `text` in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        let metrics = self.metrics();
        text.chars().map(|ch| metrics.char_width(ch, font_size)).sum()
    }
}
