//! # Text Preparation
//!
//! Text elements store editor markup (`<p>Hello <b>world</b></p>`). Export
//! renders plain text only: tags are dropped, entities decoded, and the
//! result is wrapped greedily to the element's inner width using UAX #14
//! break opportunities and Helvetica advance widths.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::StandardFont;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in points at the font size used for breaking.
    pub width: f64,
}

/// Tags whose boundaries start a new line.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "tr",
    "pre",
];

/// Strip markup and decode entities, keeping block boundaries as newlines.
///
/// Runs of ASCII whitespace collapse to one space and each line is trimmed.
/// Blank lines at the start and end are removed; inner ones are kept.
pub fn clean_text_content(markup: &str) -> String {
    let mut raw = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(pos) = rest.find(&['<', '&'][..]) {
        raw.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if rest.starts_with('<') {
            match rest.find('>') {
                Some(end) => {
                    if tag_breaks_line(&rest[1..end]) {
                        raw.push('\n');
                    }
                    rest = &rest[end + 1..];
                }
                None => {
                    // Unterminated tag: the rest is swallowed, like a browser would.
                    rest = "";
                }
            }
        } else {
            match decode_entity(rest) {
                Some((ch, len)) => {
                    raw.push(ch);
                    rest = &rest[len..];
                }
                None => {
                    raw.push('&');
                    rest = &rest[1..];
                }
            }
        }
    }
    raw.push_str(rest);

    let lines: Vec<String> = raw
        .split('\n')
        .map(|line| {
            line.split_ascii_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

fn tag_breaks_line(tag: &str) -> bool {
    let tag = tag.trim();
    let closing = tag.starts_with('/');
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if name == "br" {
        return true;
    }
    closing && BLOCK_TAGS.contains(&name.as_str())
}

/// Decode the entity at the start of `s`. Returns the character and the
/// number of bytes consumed.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let (end, _) = s.char_indices().take(12).find(|&(_, c)| c == ';')?;
    let body = &s[1..end];
    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{00A0}',
            "copy" => '©',
            "reg" => '®',
            "ndash" => '–',
            "mdash" => '—',
            "hellip" => '…',
            "lsquo" => '‘',
            "rsquo" => '’',
            "ldquo" => '“',
            "rdquo" => '”',
            "bull" => '•',
            "euro" => '€',
            _ => return None,
        }
    };
    Some((ch, end + 1))
}

/// Wrap `text` into lines no wider than `max_width` points.
///
/// Breaks happen at UAX #14 opportunities; newlines are mandatory breaks.
/// A single word wider than the line is split between characters.
pub fn wrap_text(
    text: &str,
    font: StandardFont,
    font_size: f64,
    max_width: f64,
) -> Vec<BrokenLine> {
    if text.is_empty() {
        return Vec::new();
    }
    if max_width <= 0.0 {
        log::debug!("no room to wrap text (width {:.2}pt)", max_width);
        return Vec::new();
    }

    let mut breaker = LineBreaker {
        font,
        font_size,
        max_width,
        lines: Vec::new(),
        current: String::new(),
    };

    let mut start = 0;
    for (end, opportunity) in linebreaks(text) {
        let segment = text[start..end].trim_end_matches(&['\n', '\r', '\u{2028}', '\u{2029}'][..]);
        start = end;
        breaker.push_segment(segment);
        if opportunity == BreakOpportunity::Mandatory {
            breaker.flush();
        }
    }
    if !breaker.current.is_empty() {
        breaker.flush();
    }
    breaker.lines
}

struct LineBreaker {
    font: StandardFont,
    font_size: f64,
    max_width: f64,
    lines: Vec<BrokenLine>,
    current: String,
}

impl LineBreaker {
    fn measure(&self, s: &str) -> f64 {
        self.font.measure_string(s, self.font_size)
    }

    fn push_segment(&mut self, segment: &str) {
        let candidate = format!("{}{}", self.current, segment);
        if self.measure(candidate.trim_end()) <= self.max_width {
            self.current = candidate;
            return;
        }
        if !self.current.trim().is_empty() {
            self.flush();
            self.current = segment.trim_start().to_string();
        } else {
            self.current = candidate.trim_start().to_string();
        }
        self.split_overlong();
    }

    /// Emit character-split lines while the pending text is too wide.
    fn split_overlong(&mut self) {
        while self.measure(self.current.trim_end()) > self.max_width {
            let mut width = 0.0;
            let mut cut = 0;
            for (i, ch) in self.current.char_indices() {
                let w = self.font.metrics().char_width(ch, self.font_size);
                if width + w > self.max_width && i > 0 {
                    break;
                }
                width += w;
                cut = i + ch.len_utf8();
            }
            let rest = self.current.split_off(cut);
            self.flush();
            self.current = rest.trim_start().to_string();
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.current).trim_end().to_string();
        let width = self.measure(&text);
        self.lines.push(BrokenLine { text, width });
    }
}
