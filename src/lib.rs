//! # pagegrid
//!
//! A grid-cell page layout engine with single-page PDF export.
//!
//! A page is divided into a fixed grid of columns and rows. Text and image
//! elements occupy rectangular spans of cells, and no two elements may
//! share a cell. The [`engine::LayoutEngine`] owns the layout and applies
//! placement commands; anything that would overlap or leave the grid is
//! rejected and leaves the layout untouched.
//!
//! ## Architecture
//!
//! ```text
//! Layout JSON / UI commands
//!       ↓
//!   [model]    - Layout, grid config, elements, templates
//!       ↓
//!   [engine]   - Collision rules, selection, subscribers
//!       ↓
//!   [grid]     - Cell geometry in points
//!       ↓
//!   [export]   - Style resolution, text wrap, image fit, progress
//!       ↓
//!   [pdf]      - Serialize to PDF bytes
//! ```

pub mod engine;
pub mod error;
pub mod export;
pub mod fit;
pub mod font;
pub mod grid;
pub mod image_loader;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;
pub mod units;

pub use engine::{ElementUpdate, LayoutEngine, LayoutEvent};
pub use error::PageGridError;
pub use export::{export_document, ExportArtifact, ExportOptions, ExportProgress, ExportStage};
pub use model::{GridPosition, Layout, LayoutElement};

/// Parse a layout from JSON, checking its structural invariants.
pub fn parse_layout(json: &str) -> Result<Layout, PageGridError> {
    let layout: Layout = serde_json::from_str(json)?;
    layout.validate().map_err(PageGridError::InvalidLayout)?;
    Ok(layout)
}

/// Export a layout described as JSON to a PDF artifact.
///
/// Progress is only logged; use [`export_document`] to observe it.
pub fn export_json(json: &str, options: &ExportOptions) -> Result<ExportArtifact, PageGridError> {
    let layout = parse_layout(json)?;
    export_document(&layout, options, None)
}
