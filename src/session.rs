//! Slicing session state.
//!
//! A [`SlicerSession`] owns everything the interaction surface manipulates:
//! the loaded image and its display layout, the requested slice count, and
//! the boundary lines. Mapping, rendering and exporting read from it
//! explicitly instead of from ambient state.
//!
//! # Export Guard
//!
//! [`SlicerSession::prepare_export`] snapshots the image and regions into an
//! [`ExportJob`] and marks the session busy until the job is dropped. While
//! busy, a second export and any mutation of the session are rejected with
//! [`SliceError::ExportInProgress`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SliceError;
use crate::export::{DownloadTarget, ExportBundle, Exporter};
use crate::geometry::{compute_regions, BoundaryLines, CanvasSize, DisplayLayout, SliceRegion};
use crate::render::SourceImage;

/// Number of slices a new session starts with.
pub const DEFAULT_SLICE_COUNT: usize = 3;

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone)]
struct LoadedImage {
    source: SourceImage,
    layout: DisplayLayout,
}

/// Interactive slicing state for one image at a time.
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use strip_slicer::geometry::CanvasSize;
/// use strip_slicer::render::SourceImage;
/// use strip_slicer::session::SlicerSession;
///
/// let mut session = SlicerSession::new(CanvasSize::new(1700.0, 1500.0));
/// session.load_source(SourceImage::from_rgba(RgbaImage::new(1000, 3000))).unwrap();
/// session.set_slice_count(3).unwrap();
///
/// let regions = session.regions().unwrap();
/// assert_eq!((regions[2].start_row, regions[2].end_row), (2000, 3000));
/// ```
#[derive(Debug)]
pub struct SlicerSession {
    canvas: CanvasSize,
    image: Option<LoadedImage>,
    lines: BoundaryLines,
    exporting: Arc<AtomicBool>,
}

impl SlicerSession {
    /// Create an empty session with [`DEFAULT_SLICE_COUNT`] slices.
    ///
    /// Lines are laid out over the canvas height until an image is loaded.
    pub fn new(canvas: CanvasSize) -> Self {
        let lines = BoundaryLines::spaced(DEFAULT_SLICE_COUNT, canvas_extent(canvas));

        Self {
            canvas,
            image: None,
            lines,
            exporting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Decode and load an image from file bytes.
    ///
    /// Empty input is treated as "no file selected" and leaves the session
    /// untouched, returning `Ok(false)`. On success the lines are regenerated
    /// for the current slice count over the new image.
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<bool, SliceError> {
        self.ensure_idle()?;
        if bytes.is_empty() {
            debug!("No image data, ignoring load");
            return Ok(false);
        }

        let source = SourceImage::decode(bytes)?;
        self.load_source(source)?;
        Ok(true)
    }

    /// Load an already decoded image.
    pub fn load_source(&mut self, source: SourceImage) -> Result<(), SliceError> {
        self.ensure_idle()?;

        let (width, height) = source.dimensions();
        let layout = DisplayLayout::fit(self.canvas, width, height)?;
        info!(
            "Loaded {}x{} image, display scale {:.4}",
            width,
            height,
            layout.scale()
        );

        self.image = Some(LoadedImage { source, layout });
        self.lines = BoundaryLines::evenly_spaced(self.lines.slice_count(), self.line_extent())?;
        Ok(())
    }

    /// Change the slice count, discarding every existing line.
    pub fn set_slice_count(&mut self, slice_count: usize) -> Result<(), SliceError> {
        self.ensure_idle()?;
        self.lines = BoundaryLines::evenly_spaced(slice_count, self.line_extent())?;
        debug!(slice_count, "Regenerated boundary lines");
        Ok(())
    }

    pub fn slice_count(&self) -> usize {
        self.lines.slice_count()
    }

    /// Drag one line vertically. Returns the clamped position.
    pub fn move_line(&mut self, index: usize, y: f64) -> Result<f64, SliceError> {
        self.ensure_idle()?;
        self.lines.move_line(index, y)
    }

    /// Place every line at once, in line order.
    ///
    /// `positions` must hold exactly one value per existing line. Nothing is
    /// changed if any position is rejected.
    pub fn set_lines(&mut self, positions: &[f64]) -> Result<(), SliceError> {
        self.ensure_idle()?;
        if positions.len() != self.lines.len() {
            return Err(SliceError::LineCountMismatch {
                expected: self.lines.len(),
                actual: positions.len(),
            });
        }

        let mut lines = self.lines.clone();
        for (index, &y) in positions.iter().enumerate() {
            lines.move_line(index, y)?;
        }
        self.lines = lines;
        Ok(())
    }

    pub fn lines(&self) -> &BoundaryLines {
        &self.lines
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn layout(&self) -> Option<&DisplayLayout> {
        self.image.as_ref().map(|i| &i.layout)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.image.as_ref().map(|i| &i.source)
    }

    /// Vertical span lines can move in: the image's display height, or the
    /// canvas height when no image is loaded.
    pub fn line_extent(&self) -> f64 {
        match &self.image {
            Some(image) => image.layout.display_height(),
            None => canvas_extent(self.canvas),
        }
    }

    /// Source regions for the current lines.
    pub fn regions(&self) -> Result<Vec<SliceRegion>, SliceError> {
        let image = self.image.as_ref().ok_or(SliceError::NoImage)?;
        let (_, height) = image.source.dimensions();
        compute_regions(self.lines.positions(), image.layout.scale(), height)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::SeqCst)
    }

    /// Snapshot the image and regions and mark the session busy.
    ///
    /// # Errors
    ///
    /// [`SliceError::ExportInProgress`] if another job is alive,
    /// [`SliceError::NoImage`] without an image, or any region error.
    pub fn prepare_export(&self) -> Result<ExportJob, SliceError> {
        let guard = ExportGuard::acquire(&self.exporting)?;
        let image = self.image.as_ref().ok_or(SliceError::NoImage)?;
        let regions = self.regions()?;

        Ok(ExportJob {
            source: image.source.clone(),
            regions,
            _guard: guard,
        })
    }

    /// Export the current slices into a bundle.
    pub async fn export(&self, exporter: &Exporter) -> Result<ExportBundle, SliceError> {
        self.prepare_export()?.run(exporter).await
    }

    /// Export the current slices and deliver the archive.
    pub async fn export_to(
        &self,
        exporter: &Exporter,
        target: &dyn DownloadTarget,
    ) -> Result<ExportBundle, SliceError> {
        self.prepare_export()?.run_to(exporter, target).await
    }

    fn ensure_idle(&self) -> Result<(), SliceError> {
        if self.is_exporting() {
            return Err(SliceError::ExportInProgress);
        }
        Ok(())
    }
}

impl Default for SlicerSession {
    fn default() -> Self {
        Self::new(CanvasSize::default())
    }
}

fn canvas_extent(canvas: CanvasSize) -> f64 {
    if canvas.height.is_finite() && canvas.height > 0.0 {
        canvas.height
    } else {
        0.0
    }
}

// =============================================================================
// Export Job
// =============================================================================

/// Everything an export needs, detached from the session.
///
/// Holds the session's busy flag until dropped.
#[derive(Debug)]
pub struct ExportJob {
    source: SourceImage,
    regions: Vec<SliceRegion>,
    _guard: ExportGuard,
}

impl ExportJob {
    pub fn regions(&self) -> &[SliceRegion] {
        &self.regions
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub async fn run(self, exporter: &Exporter) -> Result<ExportBundle, SliceError> {
        exporter.export(&self.source, &self.regions).await
    }

    pub async fn run_to(
        self,
        exporter: &Exporter,
        target: &dyn DownloadTarget,
    ) -> Result<ExportBundle, SliceError> {
        exporter.export_to(&self.source, &self.regions, target).await
    }
}

#[derive(Debug)]
struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl ExportGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, SliceError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SliceError::ExportInProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Tests
// =============================================================================
