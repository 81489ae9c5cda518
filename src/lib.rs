//! # strip-slicer
//!
//! Split a tall image (long screenshot, comic strip) into horizontal slices
//! that fit a per-file size limit, and bundle them into one ZIP archive.
//!
//! ## Features
//!
//! - **Display-space lines**: boundaries are placed on a scaled canvas and
//!   mapped back to exact source rows
//! - **Lossless first**: slices stay PNG when they fit under the ceiling
//! - **Size-bounded JPEG fallback**: a downward quality walk finds the best
//!   JPEG under the ceiling, best effort at the quality floor
//! - **Concurrent export**: per-slice pipelines run in parallel and are joined
//!   before the archive is built
//!
//! ## Architecture
//!
//! - [`geometry`] - Canvas layout, boundary lines and region mapping
//! - [`render`] - Image decoding and slice rasterization
//! - [`encode`] - PNG/JPEG encoding and the size-bounded compressor
//! - [`export`] - Export orchestration, archive packaging and download targets
//! - [`session`] - Interactive session state and the export guard
//! - [`cancel`] - Cooperative cancellation of slice work
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use strip_slicer::{CanvasSize, ExportOptions, Exporter, FileDownload, SlicerSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strip_slicer::SliceError> {
//!     let bytes = std::fs::read("long-screenshot.png")?;
//!
//!     let mut session = SlicerSession::new(CanvasSize::default());
//!     session.load_image(&bytes)?;
//!     session.set_slice_count(4)?;
//!     session.move_line(0, 350.0)?;
//!
//!     let exporter = Exporter::new(ExportOptions::default())?;
//!     let bundle = session.export_to(&exporter, &FileDownload::new(".")).await?;
//!     println!("{} slices in {}", bundle.slices.len(), bundle.file_name);
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod config;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use cancel::CancelFlag;
pub use config::{Cli, Command, ExportConfig, LayoutArgs, OutputFormat, PlanConfig};
pub use encode::{
    clamp_quality, is_valid_quality, CompressedImage, QualitySearch, SizeBoundedCompressor,
    SliceEncoder, DEFAULT_QUALITY_FLOOR, DEFAULT_QUALITY_START, DEFAULT_QUALITY_STEP,
    DEFAULT_SIZE_CEILING,
};
pub use error::SliceError;
pub use export::{
    build_archive, DownloadTarget, ExportBundle, ExportOptions, Exporter, FileDownload,
    SliceArtifact, SliceFormat, SliceSummary, DEFAULT_ARCHIVE_FOLDER, DEFAULT_ARCHIVE_NAME,
};
pub use geometry::{compute_regions, BoundaryLines, CanvasSize, DisplayLayout, SliceRegion};
pub use render::{render_region, SourceImage};
pub use session::{ExportJob, SlicerSession, DEFAULT_SLICE_COUNT};
