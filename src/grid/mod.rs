//! # Grid Geometry
//!
//! Pure functions mapping grid coordinates to page coordinates. Every track
//! in a grid has the same size, so a cell's rectangle follows directly from
//! its index:
//!
//! ```text
//! track  = (available - gap * (count - 1)) / count
//! offset = inset + index * (track + gap)
//! ```
//!
//! Columns run along the page width and rows along the page height of the
//! *oriented* page. Coordinates are in points with the origin at the top
//! left; the PDF writer does the y-flip.

use serde::Serialize;

use crate::model::{GridConfig, GridPosition, Orientation, PageSetup};
use crate::units::{to_points, PT_PER_PX};

/// An axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Shift by the given offset.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Page size in points after orientation has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
}

/// One grid cell, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

/// Every cell of the grid in row-major order.
pub fn compute_cells(grid: &GridConfig) -> Vec<Cell> {
    let mut cells = Vec::with_capacity((grid.rows * grid.columns) as usize);
    for row in 1..=grid.rows {
        for col in 1..=grid.columns {
            cells.push(Cell { row, col });
        }
    }
    cells
}

/// Resolve the stored page lengths and swap them for landscape.
pub fn page_dimensions(page: &PageSetup) -> PageDimensions {
    let width = to_points(&page.width);
    let height = to_points(&page.height);
    match page.orientation {
        Orientation::Portrait => PageDimensions { width, height },
        Orientation::Landscape => PageDimensions {
            width: height,
            height: width,
        },
    }
}

/// Track sizes and offsets for one concrete page.
///
/// The editor canvas lays cells edge to edge with the configured gap; the
/// exporter uses a fixed margin and no gap. Both are expressed with an
/// `inset` and a `gap` here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    inset: f64,
    gap: f64,
    col_width: f64,
    row_height: f64,
}

impl GridMetrics {
    /// `inset` and `gap` are in points.
    pub fn new(grid: &GridConfig, page: PageDimensions, inset: f64, gap: f64) -> Self {
        let columns = grid.columns.max(1);
        let rows = grid.rows.max(1);
        Self {
            inset,
            gap,
            col_width: track_size(page.width - 2.0 * inset, columns, gap),
            row_height: track_size(page.height - 2.0 * inset, rows, gap),
        }
    }

    pub fn col_width(&self) -> f64 {
        self.col_width
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Rectangle of a position's whole footprint, gaps between its own
    /// tracks included.
    pub fn span_rect(&self, pos: &GridPosition) -> Rect {
        let col_span = pos.col_span().max(1);
        let row_span = pos.row_span().max(1);
        Rect {
            x: self.inset + track_offset(pos.start_col, self.col_width, self.gap),
            y: self.inset + track_offset(pos.start_row, self.row_height, self.gap),
            width: span_length(col_span, self.col_width, self.gap),
            height: span_length(row_span, self.row_height, self.gap),
        }
    }
}

fn track_size(available: f64, count: u32, gap: f64) -> f64 {
    let gaps = gap * count.saturating_sub(1) as f64;
    ((available - gaps) / count as f64).max(0.0)
}

/// Offset of a 1-based track from the grid origin.
fn track_offset(index: u32, track: f64, gap: f64) -> f64 {
    index.saturating_sub(1) as f64 * (track + gap)
}

fn span_length(span: u32, track: f64, gap: f64) -> f64 {
    span as f64 * track + span.saturating_sub(1) as f64 * gap
}

/// Canvas metrics: no outer margin, the grid gap converted from px to pt.
pub fn canvas_metrics(grid: &GridConfig, page: PageDimensions) -> GridMetrics {
    GridMetrics::new(grid, page, 0.0, grid.gap as f64 * PT_PER_PX)
}

/// The rectangle of the cell at (row, col) on the editor canvas.
pub fn cell_rect(grid: &GridConfig, page: PageDimensions, row: u32, col: u32) -> Rect {
    canvas_metrics(grid, page).span_rect(&GridPosition::cell(row, col))
}

/// The rectangle covered by a whole position on the editor canvas.
pub fn span_rect(grid: &GridConfig, page: PageDimensions, pos: &GridPosition) -> Rect {
    canvas_metrics(grid, page).span_rect(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.001
    }

    fn grid(columns: u32, rows: u32, gap: u32) -> GridConfig {
        GridConfig {
            columns,
            rows,
            gap,
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_cells_row_major() {
        let cells = compute_cells(&grid(3, 2, 0));
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell { row: 1, col: 1 });
        assert_eq!(cells[1], Cell { row: 1, col: 2 });
        assert_eq!(cells[3], Cell { row: 2, col: 1 });
        assert_eq!(cells[5], Cell { row: 2, col: 3 });
    }

    #[test]
    fn test_page_dimensions_landscape_swaps() {
        let mut page = PageSetup::default();
        let portrait = page_dimensions(&page);
        assert!(portrait.width < portrait.height);
        page.orientation = Orientation::Landscape;
        let landscape = page_dimensions(&page);
        assert!(close(landscape.width, portrait.height));
        assert!(close(landscape.height, portrait.width));
    }

    #[test]
    fn test_cell_rect_without_gap() {
        let page = PageDimensions {
            width: 400.0,
            height: 200.0,
        };
        let r = cell_rect(&grid(4, 2, 0), page, 2, 3);
        assert!(close(r.x, 200.0));
        assert!(close(r.y, 100.0));
        assert!(close(r.width, 100.0));
        assert!(close(r.height, 100.0));
    }

    #[test]
    fn test_cell_rect_with_gap() {
        // 40px gap = 30pt.
        let page = PageDimensions {
            width: 330.0,
            height: 100.0,
        };
        let g = grid(2, 1, 40);
        let first = cell_rect(&g, page, 1, 1);
        let second = cell_rect(&g, page, 1, 2);
        assert!(close(first.width, 150.0));
        assert!(close(second.x, 180.0));
        assert!(close(second.x + second.width, 330.0));
    }

    #[test]
    fn test_span_rect_includes_inner_gaps() {
        let page = PageDimensions {
            width: 330.0,
            height: 100.0,
        };
        let r = span_rect(&grid(2, 1, 40), page, &GridPosition::spanning(1, 1, 2, 1));
        assert!(close(r.x, 0.0));
        assert!(close(r.width, 330.0));
    }

    #[test]
    fn test_landscape_columns_follow_page_width() {
        let page = page_dimensions(&PageSetup {
            orientation: Orientation::Landscape,
            ..PageSetup::default()
        });
        let g = grid(12, 8, 0);
        let first = cell_rect(&g, page, 1, 1);
        assert!(close(first.width, page.width / 12.0));
        assert!(close(first.height, page.height / 8.0));
        assert!(first.width < first.height);

        let last = cell_rect(&g, page, 8, 12);
        assert!((last.x + last.width - 841.89).abs() < 0.01);
        assert!((last.y + last.height - 595.28).abs() < 0.01);
    }

    #[test]
    fn test_metrics_with_margin() {
        let page = PageDimensions {
            width: 140.0,
            height: 240.0,
        };
        let m = GridMetrics::new(&grid(2, 4, 10), page, 20.0, 0.0);
        assert!(close(m.col_width(), 50.0));
        assert!(close(m.row_height(), 50.0));
        let r = m.span_rect(&GridPosition::cell(4, 2));
        assert!(close(r.x, 70.0));
        assert!(close(r.y, 170.0));
    }
}
