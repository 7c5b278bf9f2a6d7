//! # Layout Model
//!
//! The interchange representation of a grid layout. This is what gets saved
//! to and loaded from JSON, so field names and shapes are fixed:
//!
//! ```text
//! { "grid": { "columns", "rows", "gap", "page": { "width", "height", "orientation" } },
//!   "elements": [ { "id", "type", "gridPosition", "content"?, "src"?, "fit"?, "styles"? } ] }
//! ```
//!
//! Styles are stored exactly as the user typed them. Defaults are applied by
//! the [`style`](crate::style) resolver at export time, never written back.

mod lenient;
pub mod templates;

pub use templates::{element_templates, ElementTemplate};

use serde::{Deserialize, Serialize};

/// Smallest and largest allowed column/row counts.
pub const MIN_TRACKS: u32 = 1;
pub const MAX_TRACKS: u32 = 24;
/// Largest allowed gap between cells, in pixels.
pub const MAX_GAP: u32 = 50;

/// A complete layout: the grid plus its elements in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub grid: GridConfig,
    /// Storage order is z-order: later elements paint over earlier ones.
    #[serde(default)]
    pub elements: Vec<LayoutElement>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            elements: Vec::new(),
        }
    }
}

impl Layout {
    /// Look up an element by id.
    pub fn element(&self, id: &str) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Check the structural invariants a loaded layout must satisfy.
    ///
    /// Overlapping elements are tolerated (a hand-edited file should still
    /// render); out-of-range grids, broken spans and duplicate ids are not.
    pub fn validate(&self) -> Result<(), String> {
        self.grid.validate()?;
        let mut seen = std::collections::HashSet::new();
        for element in &self.elements {
            if element.id.is_empty() {
                return Err("element with empty id".to_string());
            }
            if !seen.insert(element.id.as_str()) {
                return Err(format!("duplicate element id '{}'", element.id));
            }
            if !element.grid_position.fits_within(&self.grid) {
                return Err(format!(
                    "element '{}' has position {:?} outside a {}x{} grid",
                    element.id, element.grid_position, self.grid.columns, self.grid.rows
                ));
            }
        }
        Ok(())
    }
}

/// Grid dimensions and the page the grid is laid on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: u32,
    pub rows: u32,
    /// Gap between cells in pixels.
    pub gap: u32,
    pub page: PageSetup,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            rows: 8,
            gap: 10,
            page: PageSetup::default(),
        }
    }
}

impl GridConfig {
    pub fn columns_in_range(columns: u32) -> bool {
        (MIN_TRACKS..=MAX_TRACKS).contains(&columns)
    }

    pub fn rows_in_range(rows: u32) -> bool {
        (MIN_TRACKS..=MAX_TRACKS).contains(&rows)
    }

    pub fn gap_in_range(gap: u32) -> bool {
        gap <= MAX_GAP
    }

    pub fn validate(&self) -> Result<(), String> {
        if !Self::columns_in_range(self.columns) {
            return Err(format!(
                "columns must be {}..={}, got {}",
                MIN_TRACKS, MAX_TRACKS, self.columns
            ));
        }
        if !Self::rows_in_range(self.rows) {
            return Err(format!(
                "rows must be {}..={}, got {}",
                MIN_TRACKS, MAX_TRACKS, self.rows
            ));
        }
        if !Self::gap_in_range(self.gap) {
            return Err(format!("gap must be 0..={}, got {}", MAX_GAP, self.gap));
        }
        Ok(())
    }
}

/// Page size as stored length strings plus orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSetup {
    pub width: String,
    pub height: String,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for PageSetup {
    fn default() -> Self {
        let (width, height) = PageSize::A4.lengths();
        Self {
            width: width.to_string(),
            height: height.to_string(),
            orientation: Orientation::Portrait,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Landscape => Orientation::Portrait,
        }
    }
}

/// Named page sizes offered to the grid configuration panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom,
}

impl PageSize {
    pub const ALL: [PageSize; 7] = [
        PageSize::A4,
        PageSize::A3,
        PageSize::A5,
        PageSize::Letter,
        PageSize::Legal,
        PageSize::Tabloid,
        PageSize::Custom,
    ];

    /// Stored (width, height) strings. `Custom` starts from A4.
    pub fn lengths(&self) -> (&'static str, &'static str) {
        match self {
            PageSize::A4 | PageSize::Custom => ("210mm", "297mm"),
            PageSize::A3 => ("297mm", "420mm"),
            PageSize::A5 => ("148mm", "210mm"),
            PageSize::Letter => ("8.5in", "11in"),
            PageSize::Legal => ("8.5in", "14in"),
            PageSize::Tabloid => ("11in", "17in"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A4 => "a4",
            PageSize::A3 => "a3",
            PageSize::A5 => "a5",
            PageSize::Letter => "letter",
            PageSize::Legal => "legal",
            PageSize::Tabloid => "tabloid",
            PageSize::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4 (210 × 297 mm)",
            PageSize::A3 => "A3 (297 × 420 mm)",
            PageSize::A5 => "A5 (148 × 210 mm)",
            PageSize::Letter => "Letter (8.5 × 11 in)",
            PageSize::Legal => "Legal (8.5 × 14 in)",
            PageSize::Tabloid => "Tabloid (11 × 17 in)",
            PageSize::Custom => "Custom Size",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Which preset a page setup corresponds to, by exact string match.
    pub fn detect(page: &PageSetup) -> Self {
        Self::ALL
            .into_iter()
            .filter(|s| *s != PageSize::Custom)
            .find(|s| {
                let (w, h) = s.lengths();
                page.width == w && page.height == h
            })
            .unwrap_or(PageSize::Custom)
    }
}

/// A cell range: 1-based, end-exclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPosition {
    pub start_col: u32,
    pub end_col: u32,
    pub start_row: u32,
    pub end_row: u32,
}

impl GridPosition {
    /// A single cell at (row, col).
    pub fn cell(row: u32, col: u32) -> Self {
        Self::spanning(row, col, 1, 1)
    }

    /// Ends saturate at `u32::MAX`; such a position never fits a grid.
    pub fn spanning(row: u32, col: u32, col_span: u32, row_span: u32) -> Self {
        Self {
            start_col: col,
            end_col: col.saturating_add(col_span),
            start_row: row,
            end_row: row.saturating_add(row_span),
        }
    }

    /// Like [`GridPosition::spanning`], `None` when an end overflows.
    pub fn checked_spanning(row: u32, col: u32, col_span: u32, row_span: u32) -> Option<Self> {
        Some(Self {
            start_col: col,
            end_col: col.checked_add(col_span)?,
            start_row: row,
            end_row: row.checked_add(row_span)?,
        })
    }

    pub fn col_span(&self) -> u32 {
        self.end_col.saturating_sub(self.start_col)
    }

    pub fn row_span(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row)
    }

    /// Two footprints overlap iff neither lies entirely to one side of the
    /// other. Touching edges do not count.
    pub fn overlaps(&self, other: &GridPosition) -> bool {
        !(self.end_col <= other.start_col
            || self.start_col >= other.end_col
            || self.end_row <= other.start_row
            || self.start_row >= other.end_row)
    }

    /// Non-empty and inside `[1, columns+1] x [1, rows+1]`.
    pub fn fits_within(&self, grid: &GridConfig) -> bool {
        self.start_col >= 1
            && self.start_row >= 1
            && self.end_col > self.start_col
            && self.end_row > self.start_row
            && self.end_col <= grid.columns.saturating_add(1)
            && self.end_row <= grid.rows.saturating_add(1)
    }
}

/// The two kinds of content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
}

/// How an image maps into its cell box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Cover,
    Contain,
    Fill,
    Stretch,
}

/// A block placed on the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub grid_position: GridPosition,
    /// Raw markup for text elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// URL or data URI for image elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::variant",
        skip_serializing_if = "Option::is_none"
    )]
    pub fit: Option<FitMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<ElementStyles>,
}

impl LayoutElement {
    /// Create a text element.
    pub fn text(id: &str, position: GridPosition, content: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ElementKind::Text,
            grid_position: position,
            content: Some(content.to_string()),
            src: None,
            fit: None,
            styles: None,
        }
    }

    /// Create an image element.
    pub fn image(id: &str, position: GridPosition, src: &str, fit: FitMode) -> Self {
        Self {
            id: id.to_string(),
            kind: ElementKind::Image,
            grid_position: position,
            content: None,
            src: Some(src.to_string()),
            fit: Some(fit),
            styles: None,
        }
    }

    pub fn with_styles(mut self, styles: ElementStyles) -> Self {
        self.styles = Some(styles);
        self
    }
}

/// Style attributes exactly as stored. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyles {
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_size: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_weight: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::variant",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_align: Option<TextAlign>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_height: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub padding: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub border: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub border_width: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub border_color: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub border_radius: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_a4_12x8() {
        let layout = Layout::default();
        assert_eq!(layout.grid.columns, 12);
        assert_eq!(layout.grid.rows, 8);
        assert_eq!(layout.grid.gap, 10);
        assert_eq!(layout.grid.page.width, "210mm");
        assert_eq!(layout.grid.page.orientation, Orientation::Portrait);
        assert!(layout.elements.is_empty());
    }

    #[test]
    fn test_span_arithmetic_never_overflows() {
        assert_eq!(GridPosition::checked_spanning(u32::MAX, 1, 1, 1), None);
        assert_eq!(GridPosition::checked_spanning(1, 2, u32::MAX, 1), None);
        assert_eq!(
            GridPosition::checked_spanning(2, 3, 4, 5),
            Some(GridPosition::spanning(2, 3, 4, 5))
        );

        let saturated = GridPosition::spanning(u32::MAX, u32::MAX, 1, 1);
        assert_eq!(saturated.end_row, u32::MAX);
        assert!(!saturated.fits_within(&GridConfig::default()));
    }

    #[test]
    fn test_overlap_touching_edges() {
        let a = GridPosition::spanning(1, 1, 2, 2);
        let right = GridPosition::cell(1, 3);
        let below = GridPosition::cell(3, 1);
        let inside = GridPosition::cell(2, 2);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_fits_within() {
        let grid = GridConfig::default();
        assert!(GridPosition::spanning(1, 1, 12, 8).fits_within(&grid));
        assert!(!GridPosition::spanning(1, 2, 12, 1).fits_within(&grid));
        assert!(!GridPosition::cell(0, 1).fits_within(&grid));
        let empty = GridPosition {
            start_col: 3,
            end_col: 3,
            start_row: 1,
            end_row: 2,
        };
        assert!(!empty.fits_within(&grid));
    }

    #[test]
    fn test_element_json_shape() {
        let el = LayoutElement::text("element-1", GridPosition::cell(2, 3), "<p>Hi</p>");
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["gridPosition"]["startCol"], 3);
        assert_eq!(json["gridPosition"]["endRow"], 3);
        assert!(json.get("src").is_none());
        assert!(json.get("styles").is_none());
    }

    #[test]
    fn test_parse_saved_layout_json() {
        let json = r##"{
          "grid": { "columns": 4, "rows": 3, "gap": 5,
                    "page": { "width": "8.5in", "height": "11in", "orientation": "landscape" } },
          "elements": [
            { "id": "element-a", "type": "image",
              "gridPosition": { "startCol": 1, "endCol": 3, "startRow": 1, "endRow": 2 },
              "src": "", "fit": "contain", "styles": { "borderWidth": "2px" } }
          ]
        }"##;
        let layout: Layout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.grid.page.orientation, Orientation::Landscape);
        let el = &layout.elements[0];
        assert_eq!(el.kind, ElementKind::Image);
        assert_eq!(el.fit, Some(FitMode::Contain));
        assert_eq!(el.grid_position.col_span(), 2);
        assert_eq!(
            el.styles.as_ref().unwrap().border_width.as_deref(),
            Some("2px")
        );
        assert!(layout.validate().is_ok());
    }

    fn styles_from(json: &str) -> ElementStyles {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_malformed_style_values_read_as_absent() {
        let s = styles_from(r#"{ "textAlign": "start", "lineHeight": "tall", "color": ["red"] }"#);
        assert_eq!(s.text_align, None);
        assert_eq!(s.line_height, None);
        assert_eq!(s.color, None);

        let s = styles_from(r#"{ "textAlign": 3, "lineHeight": null, "padding": {} }"#);
        assert_eq!(s, ElementStyles::default());
    }

    #[test]
    fn test_loose_style_values_are_coerced() {
        let s = styles_from(
            r#"{ "textAlign": "Center", "lineHeight": "1.5", "fontSize": 18 }"#,
        );
        assert_eq!(s.text_align, Some(TextAlign::Center));
        assert_eq!(s.line_height, Some(1.5));
        assert_eq!(s.font_size.as_deref(), Some("18"));
    }

    #[test]
    fn test_valid_styles_round_trip_unchanged() {
        let styles = ElementStyles {
            color: Some("#112233".to_string()),
            font_size: Some("16px".to_string()),
            text_align: Some(TextAlign::Right),
            line_height: Some(1.25),
            border: Some("2px solid #ff0000".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&styles).unwrap();
        assert_eq!(styles_from(&json), styles);
    }

    #[test]
    fn test_unknown_fit_reads_as_default() {
        let json = r#"{ "id": "a", "type": "image",
            "gridPosition": { "startCol": 1, "endCol": 2, "startRow": 1, "endRow": 2 },
            "src": "", "fit": "scale-down" }"#;
        let el: LayoutElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.fit, None);
        assert_eq!(el.fit.unwrap_or_default(), FitMode::Cover);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_bad_grids() {
        let mut layout = Layout::default();
        layout
            .elements
            .push(LayoutElement::text("a", GridPosition::cell(1, 1), "x"));
        layout
            .elements
            .push(LayoutElement::text("a", GridPosition::cell(1, 2), "y"));
        assert!(layout.validate().unwrap_err().contains("duplicate"));

        let mut layout = Layout::default();
        layout.grid.columns = 30;
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_page_size_detection() {
        let mut page = PageSetup::default();
        assert_eq!(PageSize::detect(&page), PageSize::A4);
        page.width = "8.5in".to_string();
        page.height = "14in".to_string();
        assert_eq!(PageSize::detect(&page), PageSize::Legal);
        page.height = "13in".to_string();
        assert_eq!(PageSize::detect(&page), PageSize::Custom);
        assert_eq!(PageSize::from_name("Letter"), Some(PageSize::Letter));
    }
}
