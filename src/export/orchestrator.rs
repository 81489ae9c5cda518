//! Export orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                           Exporter                            │
//! │                                                               │
//! │   region 1 ──▶ render ──▶ PNG ──(> ceiling?)──▶ JPEG walk ──┐ │
//! │   region 2 ──▶ render ──▶ PNG ──(> ceiling?)──▶ JPEG walk ──┤ │
//! │   ...              (blocking pool, any order)               │ │
//! │   region N ──▶ render ──▶ PNG ──(> ceiling?)──▶ JPEG walk ──┤ │
//! │                                                             ▼ │
//! │                                   join all ──▶ ZIP archive    │
//! └───────────────────────────────────────────────────────┬───────┘
//!                                                         ▼
//!                                                  DownloadTarget
//! ```
//!
//! The archive is only assembled after every pipeline has finished. The first
//! pipeline error, or the deadline passing, cancels the remaining pipelines;
//! they stop at their next checkpoint and are joined before the error is
//! returned, so no slice work outlives the export. A partial archive is never
//! produced.

use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::encode::{QualitySearch, SizeBoundedCompressor, SliceEncoder, DEFAULT_SIZE_CEILING};
use crate::error::SliceError;
use crate::geometry::SliceRegion;
use crate::render::{render_region, SourceImage};

use super::archive::{build_archive, DEFAULT_ARCHIVE_FOLDER, DEFAULT_ARCHIVE_NAME};
use super::artifact::{SliceArtifact, SliceFormat, SliceSummary};
use super::target::DownloadTarget;

// =============================================================================
// Export Options
// =============================================================================

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Largest PNG kept as-is, and the JPEG target above it
    pub size_ceiling: usize,

    /// JPEG quality walk used when a PNG is too large
    pub search: QualitySearch,

    /// File name of the archive handed to the download target
    pub archive_name: String,

    /// Folder inside the archive
    pub folder: String,

    /// Give up if the export takes longer than this
    pub timeout: Option<Duration>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size_ceiling: DEFAULT_SIZE_CEILING,
            search: QualitySearch::default(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            folder: DEFAULT_ARCHIVE_FOLDER.to_string(),
            timeout: None,
        }
    }
}

impl ExportOptions {
    pub fn with_size_ceiling(mut self, size_ceiling: usize) -> Self {
        self.size_ceiling = size_ceiling;
        self
    }

    pub fn with_search(mut self, search: QualitySearch) -> Self {
        self.search = search;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_archive_name(mut self, archive_name: impl Into<String>) -> Self {
        self.archive_name = archive_name.into();
        self
    }
}

// =============================================================================
// Export Bundle
// =============================================================================

/// A finished archive plus what went into it.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle {
    pub file_name: String,

    #[serde(skip)]
    pub data: Bytes,

    /// One entry per slice, in slice order
    pub slices: Vec<SliceSummary>,
}

impl ExportBundle {
    /// Slices whose JPEG stayed above the ceiling at the quality floor.
    pub fn oversized(&self) -> impl Iterator<Item = &SliceSummary> {
        self.slices.iter().filter(|s| !s.within_ceiling)
    }
}

// =============================================================================
// Slice Pipeline
// =============================================================================

/// Render → PNG → optional JPEG fallback for a single region.
#[derive(Debug, Clone)]
struct SlicePipeline {
    encoder: SliceEncoder,
    compressor: SizeBoundedCompressor,
    size_ceiling: usize,
}

impl SlicePipeline {
    fn run(
        &self,
        source: &SourceImage,
        region: &SliceRegion,
        cancel: &CancelFlag,
    ) -> Result<SliceArtifact, SliceError> {
        cancel.check()?;
        let band = render_region(source, region)?;

        cancel.check()?;
        let png = self.encoder.encode_png(&band)?;

        if png.len() <= self.size_ceiling {
            debug!(slice = region.number(), size = png.len(), "Keeping PNG");
            return Ok(SliceArtifact {
                region: *region,
                format: SliceFormat::Png,
                data: png,
                quality: None,
                within_ceiling: true,
            });
        }

        debug!(
            slice = region.number(),
            png_size = png.len(),
            ceiling = self.size_ceiling,
            "PNG over ceiling, compressing as JPEG"
        );
        let compressed = self
            .compressor
            .compress_cancellable(&band, self.size_ceiling, cancel)?;

        Ok(SliceArtifact {
            region: *region,
            format: SliceFormat::Jpeg,
            data: compressed.data,
            quality: Some(compressed.quality),
            within_ceiling: compressed.met_target,
        })
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// Turns slice regions of a source image into a downloadable archive.
///
/// # Example
///
/// ```no_run
/// use image::RgbaImage;
/// use strip_slicer::export::{ExportOptions, Exporter, FileDownload};
/// use strip_slicer::geometry::SliceRegion;
/// use strip_slicer::render::SourceImage;
///
/// # async fn run() -> Result<(), strip_slicer::SliceError> {
/// let source = SourceImage::from_rgba(RgbaImage::new(100, 300));
/// let regions = [SliceRegion::new(0, 0, 150), SliceRegion::new(1, 150, 300)];
///
/// let exporter = Exporter::new(ExportOptions::default())?;
/// let bundle = exporter
///     .export_to(&source, &regions, &FileDownload::new("out"))
///     .await?;
/// assert_eq!(bundle.slices.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    options: ExportOptions,
    pipeline: SlicePipeline,
}

impl Exporter {
    /// Create an exporter, validating the quality search.
    pub fn new(options: ExportOptions) -> Result<Self, SliceError> {
        let compressor = SizeBoundedCompressor::with_search(options.search)?;
        let pipeline = SlicePipeline {
            encoder: SliceEncoder::new(),
            compressor,
            size_ceiling: options.size_ceiling,
        };
        Ok(Self { options, pipeline })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Encode one region on the current thread.
    pub fn export_slice(
        &self,
        source: &SourceImage,
        region: &SliceRegion,
    ) -> Result<SliceArtifact, SliceError> {
        self.pipeline.run(source, region, &CancelFlag::new())
    }

    /// Encode every region concurrently and bundle the results.
    ///
    /// # Errors
    ///
    /// Returns the first slice error, [`SliceError::Timeout`] if the
    /// configured deadline passes, or an archive error. No bundle is returned
    /// unless every slice succeeded.
    pub async fn export(
        &self,
        source: &SourceImage,
        regions: &[SliceRegion],
    ) -> Result<ExportBundle, SliceError> {
        self.export_cancellable(source, regions, &CancelFlag::new())
            .await
    }

    /// Like [`export`](Self::export), with a caller-held cancellation flag.
    ///
    /// Setting `cancel` from elsewhere stops the pipelines and fails the export
    /// with [`SliceError::Cancelled`]. The exporter sets it itself when a slice
    /// fails or the deadline passes.
    pub async fn export_cancellable(
        &self,
        source: &SourceImage,
        regions: &[SliceRegion],
        cancel: &CancelFlag,
    ) -> Result<ExportBundle, SliceError> {
        if regions.is_empty() {
            return Err(SliceError::InvalidSliceCount { count: 0 });
        }

        info!(
            "Exporting {} slice(s) from {}x{} image",
            regions.len(),
            source.width(),
            source.height()
        );

        let artifacts = self.run_pipelines(source, regions, cancel).await?;

        let data = build_archive(&self.options.folder, &artifacts)?;
        let slices: Vec<SliceSummary> = artifacts.iter().map(SliceArtifact::summary).collect();

        let bundle = ExportBundle {
            file_name: self.options.archive_name.clone(),
            data,
            slices,
        };

        let oversized = bundle.oversized().count();
        if oversized > 0 {
            warn!(
                "{} slice(s) exceed the {} byte ceiling at the lowest quality",
                oversized, self.options.size_ceiling
            );
        }
        info!(
            "Built {} ({} bytes, {} entries)",
            bundle.file_name,
            bundle.data.len(),
            bundle.slices.len()
        );

        Ok(bundle)
    }

    /// Export and hand the archive to a download target.
    pub async fn export_to(
        &self,
        source: &SourceImage,
        regions: &[SliceRegion],
        target: &dyn DownloadTarget,
    ) -> Result<ExportBundle, SliceError> {
        let bundle = self.export(source, regions).await?;
        target
            .deliver(&bundle.file_name, bundle.data.clone())
            .await?;
        Ok(bundle)
    }

    /// Fan out one blocking task per region and wait for all of them.
    ///
    /// On failure the flag is set and every task is joined before returning.
    async fn run_pipelines(
        &self,
        source: &SourceImage,
        regions: &[SliceRegion],
        cancel: &CancelFlag,
    ) -> Result<Vec<SliceArtifact>, SliceError> {
        let mut tasks = JoinSet::new();
        for region in regions {
            let pipeline = self.pipeline.clone();
            let source = source.clone();
            let cancel = cancel.clone();
            let region = *region;
            tasks.spawn_blocking(move || pipeline.run(&source, &region, &cancel));
        }

        let collected = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, collect_artifacts(&mut tasks))
                .await
                .unwrap_or(Err(SliceError::Timeout { limit })),
            None => collect_artifacts(&mut tasks).await,
        };

        match collected {
            Ok(mut artifacts) => {
                artifacts.sort_by_key(|a| a.region.index);
                Ok(artifacts)
            }
            Err(e) => {
                cancel.cancel();
                debug!(pending = tasks.len(), "Cancelling slice pipelines: {}", e);
                while tasks.join_next().await.is_some() {}
                Err(e)
            }
        }
    }
}

/// Join tasks until all succeed or one fails.
async fn collect_artifacts(
    tasks: &mut JoinSet<Result<SliceArtifact, SliceError>>,
) -> Result<Vec<SliceArtifact>, SliceError> {
    let mut artifacts = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let artifact = joined.map_err(|e| SliceError::Task {
            message: e.to_string(),
        })??;
        artifacts.push(artifact);
    }
    Ok(artifacts)
}

// =============================================================================
// Tests
// =============================================================================
