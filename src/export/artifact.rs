use bytes::Bytes;
use serde::Serialize;

use crate::geometry::SliceRegion;

/// Encoding chosen for an exported slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceFormat {
    /// Lossless, used when it fits under the ceiling
    Png,
    /// Lossy fallback from the size-bounded compressor
    Jpeg,
}

impl SliceFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SliceFormat::Png => "png",
            SliceFormat::Jpeg => "jpg",
        }
    }
}

/// One encoded slice, ready for the archive.
#[derive(Debug, Clone)]
pub struct SliceArtifact {
    /// Region of the source this slice was cut from
    pub region: SliceRegion,

    pub format: SliceFormat,

    /// Encoded file contents
    pub data: Bytes,

    /// JPEG quality, `None` for PNG
    pub quality: Option<u8>,

    /// False only for a best-effort JPEG that stayed above the ceiling
    pub within_ceiling: bool,
}

impl SliceArtifact {
    /// `slice-<n>.<ext>`, numbered from 1.
    pub fn file_name(&self) -> String {
        format!("slice-{}.{}", self.region.number(), self.format.extension())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn summary(&self) -> SliceSummary {
        SliceSummary {
            number: self.region.number(),
            file_name: self.file_name(),
            format: self.format,
            size: self.size(),
            start_row: self.region.start_row,
            end_row: self.region.end_row,
            quality: self.quality,
            within_ceiling: self.within_ceiling,
        }
    }
}

/// Report line for one exported slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SliceSummary {
    pub number: usize,
    pub file_name: String,
    pub format: SliceFormat,
    pub size: usize,
    pub start_row: u32,
    pub end_row: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    pub within_ceiling: bool,
}
