//! Size-bounded JPEG compression.
//!
//! The compressor walks JPEG quality downward in fixed steps and stops at the
//! first encoding that fits under the byte ceiling. The walk ends at the
//! quality floor; if even the floor encoding is too large it is returned
//! anyway and flagged as not meeting the target.
//!
//! This is a linear search. It relies on encoded size shrinking as quality
//! drops, which holds in practice for JPEG but is not guaranteed per step.

use bytes::Bytes;
use image::buffer::ConvertBuffer;
use image::{RgbImage, RgbaImage};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::error::SliceError;

use super::encoder::{is_valid_quality, SliceEncoder};

/// Default byte ceiling for an exported slice (400 KiB).
pub const DEFAULT_SIZE_CEILING: usize = 400 * 1024;

/// Quality of the first lossy attempt.
pub const DEFAULT_QUALITY_START: u8 = 100;

/// Quality decrement between attempts.
pub const DEFAULT_QUALITY_STEP: u8 = 2;

/// Lowest quality the search will try.
pub const DEFAULT_QUALITY_FLOOR: u8 = 70;

// =============================================================================
// Quality Search
// =============================================================================

/// Parameters of the downward quality walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualitySearch {
    pub start: u8,
    pub step: u8,
    pub floor: u8,
}

impl Default for QualitySearch {
    fn default() -> Self {
        Self {
            start: DEFAULT_QUALITY_START,
            step: DEFAULT_QUALITY_STEP,
            floor: DEFAULT_QUALITY_FLOOR,
        }
    }
}

impl QualitySearch {
    /// Create validated search parameters.
    pub fn new(start: u8, step: u8, floor: u8) -> Result<Self, SliceError> {
        let search = Self { start, step, floor };
        search.validate()?;
        Ok(search)
    }

    /// Check `1 <= floor <= start <= 100` and `step >= 1`.
    pub fn validate(&self) -> Result<(), SliceError> {
        if !is_valid_quality(self.start) || !is_valid_quality(self.floor) {
            return Err(SliceError::InvalidQualitySearch {
                reason: format!(
                    "start ({}) and floor ({}) must be between 1 and 100",
                    self.start, self.floor
                ),
            });
        }
        if self.floor > self.start {
            return Err(SliceError::InvalidQualitySearch {
                reason: format!("floor ({}) is above start ({})", self.floor, self.start),
            });
        }
        if self.step == 0 {
            return Err(SliceError::InvalidQualitySearch {
                reason: "step must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Qualities in the order they are tried. The floor is always last.
    pub fn qualities(&self) -> Vec<u8> {
        let mut qualities = Vec::new();
        let mut quality = self.start;
        while quality > self.floor {
            qualities.push(quality);
            quality = quality.saturating_sub(self.step);
        }
        qualities.push(self.floor);
        qualities
    }
}

// =============================================================================
// Compressed Image
// =============================================================================

/// Outcome of a size-bounded compression.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Encoded JPEG bytes
    pub data: Bytes,

    /// Quality of the returned encoding
    pub quality: u8,

    /// Number of encodings performed
    pub attempts: usize,

    /// Whether `data` fits under the ceiling
    pub met_target: bool,
}

// =============================================================================
// Compressor
// =============================================================================

/// Finds the highest JPEG quality whose encoding fits a byte ceiling.
#[derive(Debug, Clone, Default)]
pub struct SizeBoundedCompressor {
    encoder: SliceEncoder,
    search: QualitySearch,
}

impl SizeBoundedCompressor {
    /// Create a compressor with the default 100 → 70 walk in steps of 2.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compressor with custom search parameters.
    pub fn with_search(search: QualitySearch) -> Result<Self, SliceError> {
        search.validate()?;
        Ok(Self {
            encoder: SliceEncoder::new(),
            search,
        })
    }

    pub fn search(&self) -> QualitySearch {
        self.search
    }

    /// Compress `image` to at most `ceiling` bytes, best effort.
    ///
    /// Returns the first encoding at or under the ceiling. If none is found
    /// before the floor, the floor encoding is returned with
    /// `met_target == false`.
    pub fn compress(
        &self,
        image: &RgbaImage,
        ceiling: usize,
    ) -> Result<CompressedImage, SliceError> {
        self.compress_cancellable(image, ceiling, &CancelFlag::new())
    }

    /// Like [`compress`](Self::compress), but checks `cancel` before every
    /// attempt and returns [`SliceError::Cancelled`] once it is set.
    pub fn compress_cancellable(
        &self,
        image: &RgbaImage,
        ceiling: usize,
        cancel: &CancelFlag,
    ) -> Result<CompressedImage, SliceError> {
        cancel.check()?;
        let rgb: RgbImage = image.convert();
        let mut last = None;

        for (attempt, quality) in self.search.qualities().into_iter().enumerate() {
            cancel.check()?;
            let data = self.encoder.encode_rgb_jpeg(&rgb, quality)?;
            debug!(quality, size = data.len(), ceiling, "JPEG attempt");

            if data.len() <= ceiling {
                return Ok(CompressedImage {
                    data,
                    quality,
                    attempts: attempt + 1,
                    met_target: true,
                });
            }
            last = Some((data, quality, attempt + 1));
        }

        // qualities() is never empty
        let (data, quality, attempts) = last.ok_or_else(|| SliceError::InvalidQualitySearch {
            reason: "no qualities to try".to_string(),
        })?;

        warn!(
            quality,
            size = data.len(),
            ceiling,
            "Quality floor reached without meeting size ceiling"
        );

        Ok(CompressedImage {
            data,
            quality,
            attempts,
            met_target: false,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
