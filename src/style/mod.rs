//! # Style Resolution
//!
//! Turns the free-form stored style strings of an element into concrete
//! paint parameters. Stored styles are never modified; every default lives
//! here and is applied only when an element is painted.
//!
//! Nothing in this module fails. A value that cannot be understood resolves
//! to its default, so a half-edited layout still exports.

use crate::model::{ElementStyles, TextAlign};
use crate::units::{parse_length_prefix, to_pixels};

/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#333333";
/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
/// Default inner padding in points.
pub const DEFAULT_PADDING: f64 = 8.0;
/// Default line-height multiplier.
pub const DEFAULT_LINE_HEIGHT: f64 = 1.5;
/// Border color used when a width is given without a color.
pub const DEFAULT_BORDER_COLOR: &str = "#cccccc";

/// An RGBA color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from 0-255 channel values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// The 0-255 channels, rounded.
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Parse `#RRGGBB` (the `#` is optional, hex digits are case-insensitive).
///
/// Short `#RGB`, named colors and `rgb()` are not understood and give black.
pub fn resolve_hex_color(value: &str) -> Color {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        log::debug!("unrecognized color {:?}, using black", value);
        return Color::BLACK;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    Color::rgb8(channel(0), channel(2), channel(4))
}

/// A solid stroke around an element's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    pub width: f64,
    pub color: Color,
}

/// Box decoration shared by text and image elements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedBox {
    pub background: Option<Color>,
    pub border: Option<Border>,
    /// Corner radius in points; 0 for square corners.
    pub radius: f64,
}

/// Everything the text painter needs for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTextStyle {
    pub color: Color,
    pub font_size: f64,
    pub bold: bool,
    pub align: TextAlign,
    /// Stored multiplier. Painting uses a fixed `1.2 * font_size` leading.
    pub line_height: f64,
    pub padding: f64,
}

impl Default for ResolvedTextStyle {
    fn default() -> Self {
        resolve_text_style(None)
    }
}

/// Resolve the text-related attributes, applying defaults.
pub fn resolve_text_style(styles: Option<&ElementStyles>) -> ResolvedTextStyle {
    let Some(s) = styles else {
        return ResolvedTextStyle {
            color: resolve_hex_color(DEFAULT_TEXT_COLOR),
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
            padding: DEFAULT_PADDING,
        };
    };

    let font_size = match to_pixels(s.font_size.as_deref()) {
        0 => DEFAULT_FONT_SIZE,
        px => px as f64,
    };
    let padding = match to_pixels(s.padding.as_deref()) {
        0 => DEFAULT_PADDING,
        px => px as f64,
    };

    ResolvedTextStyle {
        color: resolve_hex_color(s.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR)),
        font_size,
        bold: s.font_weight.as_deref().map(is_bold).unwrap_or(false),
        align: s.text_align.unwrap_or_default(),
        line_height: s
            .line_height
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_LINE_HEIGHT),
        padding,
    }
}

/// Resolve background, border and corner radius.
pub fn resolve_box(styles: Option<&ElementStyles>) -> ResolvedBox {
    let Some(s) = styles else {
        return ResolvedBox::default();
    };
    ResolvedBox {
        background: s.background_color.as_deref().and_then(resolve_background),
        border: resolve_border(s),
        radius: to_pixels(s.border_radius.as_deref()) as f64,
    }
}

fn resolve_background(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("transparent") {
        None
    } else {
        Some(resolve_hex_color(value))
    }
}

fn is_bold(weight: &str) -> bool {
    let weight = weight.trim();
    if weight.eq_ignore_ascii_case("bold") || weight.eq_ignore_ascii_case("bolder") {
        return true;
    }
    weight.parse::<u32>().map(|w| w >= 600).unwrap_or(false)
}

/// `borderWidth` wins when it is a positive integer. Otherwise the `border`
/// shorthand (`"2px solid #ff0000"`) is consulted.
fn resolve_border(s: &ElementStyles) -> Option<Border> {
    let width = to_pixels(s.border_width.as_deref());
    if width > 0 {
        return Some(Border {
            width: width as f64,
            color: resolve_hex_color(s.border_color.as_deref().unwrap_or(DEFAULT_BORDER_COLOR)),
        });
    }
    parse_border_shorthand(s.border.as_deref()?)
}

fn parse_border_shorthand(value: &str) -> Option<Border> {
    let mut width = None;
    let mut color = None;
    for token in value.split_whitespace() {
        if token.eq_ignore_ascii_case("none") {
            return None;
        }
        if color.is_none() && token.starts_with('#') {
            color = Some(resolve_hex_color(token));
        } else if width.is_none() {
            let number = token.strip_suffix("px").unwrap_or(token);
            if let Some(w) = parse_length_prefix(number).filter(|_| {
                number.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            }) {
                width = Some(w.trunc());
            }
        }
    }
    let width = width.filter(|w| *w > 0.0)?;
    Some(Border {
        width,
        color: color.unwrap_or_else(|| resolve_hex_color(DEFAULT_BORDER_COLOR)),
    })
}
