//! Export of slices as a downloadable archive.
//!
//! # Components
//!
//! - [`Exporter`]: runs the per-slice pipelines concurrently and bundles them
//! - [`ExportOptions`]: size ceiling, quality walk, archive naming, timeout
//! - [`SliceArtifact`]: one encoded slice with its file name
//! - [`build_archive`]: ZIP packaging
//! - [`DownloadTarget`]: where the finished archive goes; [`FileDownload`]
//!   writes it to a directory

mod archive;
mod artifact;
mod orchestrator;
mod target;

pub use archive::{build_archive, DEFAULT_ARCHIVE_FOLDER, DEFAULT_ARCHIVE_NAME};
pub use artifact::{SliceArtifact, SliceFormat, SliceSummary};
pub use orchestrator::{ExportBundle, ExportOptions, Exporter};
pub use target::{DownloadTarget, FileDownload};
