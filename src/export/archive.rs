//! ZIP packaging of exported slices.
//!
//! Entries are stored without recompression (PNG and JPEG payloads are
//! already compressed) inside a single folder, in slice order.

use std::io::{Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::SliceError;

use super::artifact::SliceArtifact;

/// Default archive file name.
pub const DEFAULT_ARCHIVE_NAME: &str = "sliced-images.zip";

/// Folder inside the archive that holds the slices.
pub const DEFAULT_ARCHIVE_FOLDER: &str = "sliced-images";

/// Build a ZIP archive with every artifact under `folder/`.
///
/// Artifacts are written in the order given.
pub fn build_archive(folder: &str, artifacts: &[SliceArtifact]) -> Result<Bytes, SliceError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let folder = folder.trim_matches('/');
    if !folder.is_empty() {
        writer.add_directory(format!("{}/", folder), options)?;
    }

    for artifact in artifacts {
        let name = if folder.is_empty() {
            artifact.file_name()
        } else {
            format!("{}/{}", folder, artifact.file_name())
        };
        writer.start_file(name, options)?;
        writer.write_all(&artifact.data)?;
    }

    let cursor = writer.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}
