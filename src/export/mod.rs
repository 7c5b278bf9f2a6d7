//! # Document Export
//!
//! Turns a layout snapshot into a single-page PDF. The pipeline is a fixed
//! sequence of stages, each announced to an optional progress observer:
//!
//! | stage                 | progress        | work                              |
//! |-----------------------|-----------------|-----------------------------------|
//! | `preparing`           | 0               | page size, cell metrics           |
//! | `processing-elements` | 20, then 20-70  | paint each element in order       |
//! | `processing-images`   | 80              | apply the JPEG quality setting    |
//! | `finalizing`          | 90              | serialize the PDF                 |
//! | `complete`            | 100             |                                   |
//!
//! Export geometry differs from the editor canvas: the grid sits inside a
//! fixed 20pt margin and cells are laid edge to edge, without the gap.
//!
//! Problems with a single element (an undecodable image, text that does not
//! fit) never abort the export. Only pipeline-level failures do, and then no
//! `complete` event is sent.

pub mod paint;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PageGridError;
use crate::grid::{page_dimensions, GridMetrics, PageDimensions};
use crate::model::{ElementKind, Layout};
use crate::pdf::{Metadata, PdfWriter};

pub use paint::{DrawCommand, Page};

/// Margin around the grid on the exported page, in points.
pub const PDF_MARGIN: f64 = 20.0;

/// Filename used when none is given.
pub const DEFAULT_FILENAME: &str = "layout-design.pdf";

/// The pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportStage {
    Preparing,
    ProcessingElements,
    ProcessingImages,
    Finalizing,
    Complete,
}

/// One progress notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProgress {
    pub stage: ExportStage,
    /// 0..=100
    pub progress: f64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<usize>,
}

impl ExportProgress {
    fn new(stage: ExportStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress,
            message: message.into(),
            element_index: None,
            total_elements: None,
        }
    }
}

/// Receives progress notifications. Implementations must not block.
pub trait ProgressObserver {
    fn on_progress(&self, progress: &ExportProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ExportProgress),
{
    fn on_progress(&self, progress: &ExportProgress) {
        self(progress)
    }
}

/// Queues progress on a channel. When the channel is full or closed the
/// event is dropped; the export never waits for a consumer.
impl ProgressObserver for async_channel::Sender<ExportProgress> {
    fn on_progress(&self, progress: &ExportProgress) {
        if let Err(e) = self.try_send(progress.clone()) {
            log::debug!("dropping progress event ({:?}): {}", progress.stage, e);
        }
    }
}

/// Caller-tunable export settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// JPEG quality in (0, 1]. Below 1, opaque PNG/WebP images are
    /// re-encoded as JPEG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Deflate content and image streams. Defaults to true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<bool>,
}

impl ExportOptions {
    pub fn filename(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FILENAME)
    }

    pub fn compression(&self) -> bool {
        self.compression.unwrap_or(true)
    }

    fn validate(&self) -> Result<(), PageGridError> {
        if let Some(q) = self.quality {
            if !(q > 0.0 && q <= 1.0) {
                return Err(PageGridError::Export(format!(
                    "quality must be in (0, 1], got {}",
                    q
                )));
            }
        }
        Ok(())
    }
}

/// A finished PDF.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Oriented page size in points.
    pub page_width: f64,
    pub page_height: f64,
}

impl ExportArtifact {
    /// Write the PDF to `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PageGridError> {
        std::fs::write(path.as_ref(), &self.bytes)?;
        log::info!(
            "wrote {} ({} bytes) to {}",
            self.filename,
            self.bytes.len(),
            path.as_ref().display()
        );
        Ok(())
    }
}

fn report(observer: Option<&dyn ProgressObserver>, progress: ExportProgress) {
    log::debug!("export {:?} {:.0}%: {}", progress.stage, progress.progress, progress.message);
    if let Some(observer) = observer {
        observer.on_progress(&progress);
    }
}

/// Export `layout` as a single-page PDF.
pub fn export_document(
    layout: &Layout,
    options: &ExportOptions,
    observer: Option<&dyn ProgressObserver>,
) -> Result<ExportArtifact, PageGridError> {
    options.validate()?;
    let filename = options.filename().to_string();

    // Stage 1
    report(
        observer,
        ExportProgress::new(ExportStage::Preparing, 0.0, "Preparing PDF document..."),
    );
    layout
        .grid
        .validate()
        .map_err(PageGridError::Export)?;
    let dims = page_dimensions(&layout.grid.page);
    if !(dims.width > 0.0 && dims.height > 0.0) {
        return Err(PageGridError::Export(format!(
            "page size {}x{} is not positive",
            dims.width, dims.height
        )));
    }
    let metrics = export_metrics(layout, dims);
    let mut page = Page::new(dims.width, dims.height);

    // Stage 2
    let total = layout.elements.len();
    report(
        observer,
        ExportProgress {
            total_elements: Some(total),
            ..ExportProgress::new(
                ExportStage::ProcessingElements,
                20.0,
                "Processing layout elements...",
            )
        },
    );
    for (i, element) in layout.elements.iter().enumerate() {
        report(
            observer,
            ExportProgress {
                element_index: Some(i),
                total_elements: Some(total),
                ..ExportProgress::new(
                    ExportStage::ProcessingElements,
                    20.0 + (i as f64 / total as f64) * 50.0,
                    format!("Processing element {} of {}...", i + 1, total),
                )
            },
        );
        let rect = metrics.span_rect(&element.grid_position);
        match element.kind {
            ElementKind::Text => paint::paint_text_element(&mut page, element, rect),
            ElementKind::Image => paint::paint_image_element(&mut page, element, rect),
        }
    }

    // Stage 3
    report(
        observer,
        ExportProgress::new(ExportStage::ProcessingImages, 80.0, "Optimizing images..."),
    );
    if let Some(quality) = options.quality.filter(|q| *q < 1.0) {
        for image in page.images.iter_mut() {
            match image.with_jpeg_quality(quality) {
                Ok(reencoded) => *image = reencoded,
                Err(e) => log::warn!("keeping original image: {}", e),
            }
        }
    }

    // Stage 4
    report(
        observer,
        ExportProgress::new(ExportStage::Finalizing, 90.0, "Finalizing PDF..."),
    );
    let metadata = Metadata {
        title: Some(title_from_filename(&filename)),
    };
    let bytes = PdfWriter::new(options.compression()).write(&page, &metadata);

    // Stage 5
    report(
        observer,
        ExportProgress::new(ExportStage::Complete, 100.0, "PDF exported successfully!"),
    );
    log::info!(
        "exported {} element(s) to {} ({} bytes)",
        total,
        filename,
        bytes.len()
    );

    Ok(ExportArtifact {
        filename,
        bytes,
        page_width: dims.width,
        page_height: dims.height,
    })
}

/// Cell geometry on the exported page: a 20pt margin and no gap.
pub fn export_metrics(layout: &Layout, page: PageDimensions) -> GridMetrics {
    GridMetrics::new(&layout.grid, page, PDF_MARGIN, 0.0)
}

fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}
