//! Painting elements into a page display list.
//!
//! The painter turns each element's box into drawing commands in absolute
//! page coordinates (top-left origin, points). The PDF writer consumes the
//! list in order, so later commands paint over earlier ones.

use crate::font::StandardFont;
use crate::fit::fit_image;
use crate::grid::Rect;
use crate::image_loader::{load_image, LoadedImage};
use crate::model::{LayoutElement, TextAlign};
use crate::style::{resolve_box, resolve_text_style, Border, Color, ResolvedBox};
use crate::text::{clean_text_content, wrap_text};

/// Leading applied to exported text, as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.2;

/// A single page's display list plus the images it references.
#[derive(Debug, Clone)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    pub commands: Vec<DrawCommand>,
    pub images: Vec<LoadedImage>,
}

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// A rectangle, optionally filled and/or stroked.
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Border>,
        radius: f64,
    },
    /// One line of text. `x` is the left edge, `baseline` the baseline.
    Text {
        x: f64,
        baseline: f64,
        text: String,
        font: StandardFont,
        size: f64,
        color: Color,
    },
    /// `page.images[index]` drawn into `rect`, clipped to `clip`.
    Image { index: usize, rect: Rect, clip: Rect },
}

impl Page {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            images: Vec::new(),
        }
    }

    /// The fonts referenced by text commands, sorted and deduplicated.
    pub fn fonts(&self) -> Vec<StandardFont> {
        let mut fonts: Vec<StandardFont> = self
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();
        fonts
    }

    fn push_box(&mut self, rect: Rect, decoration: &ResolvedBox) {
        if let Some(fill) = decoration.background {
            self.commands.push(DrawCommand::Rect {
                rect,
                fill: Some(fill),
                stroke: None,
                radius: decoration.radius,
            });
        }
    }

    fn push_border(&mut self, rect: Rect, decoration: &ResolvedBox) {
        if let Some(border) = decoration.border {
            self.commands.push(DrawCommand::Rect {
                rect,
                fill: None,
                stroke: Some(border),
                radius: decoration.radius,
            });
        }
    }

    /// Text centered horizontally on `cx` with its baseline at `baseline`.
    fn push_centered_text(&mut self, cx: f64, baseline: f64, text: &str, size: f64, color: Color) {
        let font = StandardFont::Helvetica;
        let width = font.measure_string(text, size);
        self.commands.push(DrawCommand::Text {
            x: cx - width / 2.0,
            baseline,
            text: text.to_string(),
            font,
            size,
            color,
        });
    }
}

/// Paint a text element: background, border, then the wrapped lines.
///
/// Lines whose baseline would fall below `y + height - 2 * padding` are
/// dropped without notice.
pub fn paint_text_element(page: &mut Page, element: &LayoutElement, rect: Rect) {
    let text_style = resolve_text_style(element.styles.as_ref());
    let decoration = resolve_box(element.styles.as_ref());

    page.push_box(rect, &decoration);
    page.push_border(rect, &decoration);

    let content = clean_text_content(element.content.as_deref().unwrap_or(""));
    if content.is_empty() {
        return;
    }

    let padding = text_style.padding;
    let font = StandardFont::for_weight(text_style.bold);
    let size = text_style.font_size;
    let text_x = rect.x + padding;
    let first_baseline = rect.y + padding + size;
    let text_width = rect.width - padding * 2.0;
    let limit = rect.y + (rect.height - padding * 2.0);
    let leading = size * LINE_SPACING;

    let lines = wrap_text(&content, font, size, text_width);
    let total = lines.len();
    for (i, line) in lines.into_iter().enumerate() {
        let baseline = first_baseline + i as f64 * leading;
        if baseline > limit {
            log::debug!(
                "'{}': dropping {} of {} line(s) that overflow the box",
                element.id,
                total - i,
                total
            );
            break;
        }
        let x = match text_style.align {
            TextAlign::Left | TextAlign::Justify => text_x,
            TextAlign::Center => text_x + (text_width - line.width) / 2.0,
            TextAlign::Right => text_x + text_width - line.width,
        };
        if line.text.is_empty() {
            continue;
        }
        page.commands.push(DrawCommand::Text {
            x,
            baseline,
            text: line.text,
            font,
            size,
            color: text_style.color,
        });
    }
}

/// Paint an image element. A missing source gives the "No Image"
/// placeholder; a source that fails to decode gives "Image Error".
pub fn paint_image_element(page: &mut Page, element: &LayoutElement, rect: Rect) {
    let src = element.src.as_deref().map(str::trim).unwrap_or("");
    if src.is_empty() {
        paint_placeholder(page, rect, Placeholder::Missing);
        return;
    }

    let decoration = resolve_box(element.styles.as_ref());
    page.push_box(rect, &decoration);

    let image = match load_image(src) {
        Ok(image) => image,
        Err(e) => {
            log::warn!("'{}': {}; painting error placeholder", element.id, e);
            paint_placeholder(page, rect, Placeholder::Broken);
            return;
        }
    };

    let fitted = fit_image(
        image.aspect_ratio(),
        rect.size(),
        element.fit.unwrap_or_default(),
    )
    .translate(rect.x, rect.y);

    let index = page.images.len();
    page.images.push(image);
    page.commands.push(DrawCommand::Image {
        index,
        rect: fitted,
        clip: rect,
    });

    page.push_border(rect, &decoration);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Missing,
    Broken,
}

fn paint_placeholder(page: &mut Page, rect: Rect, kind: Placeholder) {
    let (fill, stroke, label, size, text_color) = match kind {
        Placeholder::Missing => (
            Color::rgb8(245, 245, 245),
            Color::rgb8(200, 200, 200),
            "No Image",
            12.0,
            Color::rgb8(150, 150, 150),
        ),
        Placeholder::Broken => (
            Color::rgb8(248, 215, 218),
            Color::rgb8(220, 53, 69),
            "Image Error",
            10.0,
            Color::rgb8(114, 28, 36),
        ),
    };
    page.commands.push(DrawCommand::Rect {
        rect,
        fill: Some(fill),
        stroke: Some(Border {
            width: 1.0,
            color: stroke,
        }),
        radius: 0.0,
    });
    let (cx, cy) = rect.center();
    page.push_centered_text(cx, cy, label, size, text_color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementStyles, FitMode, GridPosition};

    fn rect() -> Rect {
        Rect::new(20.0, 20.0, 200.0, 100.0)
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_text_first_baseline_and_padding() {
        let mut page = Page::new(595.0, 842.0);
        let el = LayoutElement::text("t", GridPosition::cell(1, 1), "<p>Hello</p>");
        paint_text_element(&mut page, &el, rect());
        match &page.commands[0] {
            DrawCommand::Text {
                x, baseline, text, size, font, ..
            } => {
                assert_eq!(text, "Hello");
                assert!((x - 28.0).abs() < 0.001);
                assert!((baseline - 42.0).abs() < 0.001);
                assert!((size - 14.0).abs() < 0.001);
                assert_eq!(*font, StandardFont::Helvetica);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_text_background_and_border_come_first() {
        let mut page = Page::new(595.0, 842.0);
        let el = LayoutElement::text("t", GridPosition::cell(1, 1), "Hi").with_styles(
            ElementStyles {
                background_color: Some("#eeeeee".to_string()),
                border_width: Some("1px".to_string()),
                ..Default::default()
            },
        );
        paint_text_element(&mut page, &el, rect());
        assert!(matches!(page.commands[0], DrawCommand::Rect { fill: Some(_), stroke: None, .. }));
        assert!(matches!(page.commands[1], DrawCommand::Rect { fill: None, stroke: Some(_), .. }));
        assert!(matches!(page.commands[2], DrawCommand::Text { .. }));
    }

    #[test]
    fn test_text_alignment() {
        let styles = |align| ElementStyles {
            text_align: Some(align),
            ..Default::default()
        };
        let line_x = |align| {
            let mut page = Page::new(595.0, 842.0);
            let el = LayoutElement::text("t", GridPosition::cell(1, 1), "Hello")
                .with_styles(styles(align));
            paint_text_element(&mut page, &el, rect());
            match &page.commands[0] {
                DrawCommand::Text { x, .. } => *x,
                _ => panic!("expected text"),
            }
        };
        let width = StandardFont::Helvetica.measure_string("Hello", 14.0);
        assert!((line_x(TextAlign::Left) - 28.0).abs() < 0.001);
        assert!((line_x(TextAlign::Justify) - 28.0).abs() < 0.001);
        assert!((line_x(TextAlign::Right) - (28.0 + 184.0 - width)).abs() < 0.001);
        assert!((line_x(TextAlign::Center) - (28.0 + (184.0 - width) / 2.0)).abs() < 0.001);
    }

    #[test]
    fn test_overflowing_lines_are_dropped() {
        // Box 100pt high, padding 8: baselines 42, 58.8, 75.6, 92.4 against
        // a limit of 20 + 84 = 104, so four lines survive.
        let mut page = Page::new(595.0, 842.0);
        let content = "one\ntwo\nthree\nfour\nfive\nsix";
        let el = LayoutElement::text("t", GridPosition::cell(1, 1), content);
        paint_text_element(&mut page, &el, rect());
        assert_eq!(texts(&page), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_bold_weight_selects_bold_font() {
        let mut page = Page::new(595.0, 842.0);
        let el = LayoutElement::text("t", GridPosition::cell(1, 1), "Hi").with_styles(
            ElementStyles {
                font_weight: Some("bold".to_string()),
                ..Default::default()
            },
        );
        paint_text_element(&mut page, &el, rect());
        assert_eq!(page.fonts(), vec![StandardFont::HelveticaBold]);
    }

    #[test]
    fn test_missing_image_placeholder() {
        let mut page = Page::new(595.0, 842.0);
        let el = LayoutElement::image("i", GridPosition::cell(1, 1), "", FitMode::Cover);
        paint_image_element(&mut page, &el, rect());
        match &page.commands[0] {
            DrawCommand::Rect { fill, stroke, .. } => {
                assert_eq!(fill.unwrap().to_rgb8(), (245, 245, 245));
                assert_eq!(stroke.unwrap().color.to_rgb8(), (200, 200, 200));
            }
            other => panic!("expected rect, got {:?}", other),
        }
        match &page.commands[1] {
            DrawCommand::Text {
                text, size, color, baseline, ..
            } => {
                assert_eq!(text, "No Image");
                assert!((size - 12.0).abs() < 0.001);
                assert_eq!(color.to_rgb8(), (150, 150, 150));
                assert!((baseline - 70.0).abs() < 0.001);
            }
            other => panic!("expected text, got {:?}", other),
        }
        assert!(page.images.is_empty());
    }

    #[test]
    fn test_broken_image_placeholder() {
        let mut page = Page::new(595.0, 842.0);
        let el =
            LayoutElement::image("i", GridPosition::cell(1, 1), "not an image", FitMode::Cover);
        paint_image_element(&mut page, &el, rect());
        assert_eq!(texts(&page), vec!["Image Error"]);
        match &page.commands[0] {
            DrawCommand::Rect { fill, stroke, .. } => {
                assert_eq!(fill.unwrap().to_rgb8(), (248, 215, 218));
                assert_eq!(stroke.unwrap().color.to_rgb8(), (220, 53, 69));
            }
            other => panic!("expected rect, got {:?}", other),
        }
    }

    #[test]
    fn test_image_is_fitted_and_clipped() {
        use base64::Engine;
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 255, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 2, image::ColorType::Rgba8)
            .unwrap();
        let src = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&buf)
        );

        let mut page = Page::new(595.0, 842.0);
        let square = Rect::new(10.0, 10.0, 100.0, 100.0);
        let el = LayoutElement::image("i", GridPosition::cell(1, 1), &src, FitMode::Cover);
        paint_image_element(&mut page, &el, square);
        assert_eq!(page.images.len(), 1);
        match &page.commands[0] {
            DrawCommand::Image { index, rect, clip } => {
                assert_eq!(*index, 0);
                assert_eq!(*clip, square);
                assert!((rect.x - -40.0).abs() < 0.001);
                assert!((rect.width - 200.0).abs() < 0.001);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }
}
