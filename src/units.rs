//! # Unit Conversion
//!
//! Stored page dimensions are CSS-style length strings (`"210mm"`, `"8.5in"`).
//! Everything downstream works in PDF points (1/72 inch).
//!
//! Conversion never fails: a malformed stored dimension must still export,
//! so unparsable input falls back to the A4 width.

/// Points per millimetre.
pub const PT_PER_MM: f64 = 2.834645669;
/// Points per centimetre.
pub const PT_PER_CM: f64 = 28.34645669;
/// Points per inch.
pub const PT_PER_IN: f64 = 72.0;
/// Points per CSS pixel at 96 DPI.
pub const PT_PER_PX: f64 = 0.75;

/// Fallback used when a length string cannot be parsed (A4 width).
pub const FALLBACK_POINTS: f64 = 595.0;

/// Convert a length string to points.
///
/// Supports `mm`, `cm`, `in` and `px` suffixes. A bare number is taken to
/// already be in points.
pub fn to_points(value: &str) -> f64 {
    let value = value.trim();
    let (number, factor) = if let Some(n) = value.strip_suffix("mm") {
        (n, PT_PER_MM)
    } else if let Some(n) = value.strip_suffix("cm") {
        (n, PT_PER_CM)
    } else if let Some(n) = value.strip_suffix("in") {
        (n, PT_PER_IN)
    } else if let Some(n) = value.strip_suffix("px") {
        (n, PT_PER_PX)
    } else {
        // Bare numbers: zero is treated like garbage.
        return match parse_length_prefix(value) {
            Some(v) if v != 0.0 => v,
            _ => {
                log::debug!("unparsable length {:?}, using {}pt", value, FALLBACK_POINTS);
                FALLBACK_POINTS
            }
        };
    };

    match parse_length_prefix(number) {
        Some(v) => v * factor,
        None => {
            log::debug!("unparsable length {:?}, using {}pt", value, FALLBACK_POINTS);
            FALLBACK_POINTS
        }
    }
}

/// Parse a `"Npx"` style value as a whole number of pixels.
///
/// Missing, invalid, and negative input all give 0.
pub fn to_pixels(value: Option<&str>) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    let trimmed = value.trim();
    let digits = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    let end = digits
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .ok()
        .filter(|v| *v > 0)
        .map(|v| v.min(u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Parse the leading decimal number of a string, ignoring whatever follows.
///
/// `"12.5 mm"` gives `Some(12.5)`, `"abc"` gives `None`.
pub fn parse_length_prefix(value: &str) -> Option<f64> {
    let value = value.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in value.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    value[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
