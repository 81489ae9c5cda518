//! PNG and JPEG slice encoder.
//!
//! # Design Decisions
//!
//! - **Lossless first**: every slice is encoded as PNG before any lossy
//!   attempt; JPEG is only produced by the size-bounded compressor.
//!
//! - **No resizing**: slices are encoded at their native size.
//!
//! - **Alpha is dropped for JPEG**: the JPEG codec has no alpha channel, so
//!   RGBA buffers are converted to RGB before lossy encoding.

use bytes::Bytes;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::error::SliceError;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Slice Encoder
// =============================================================================

/// Encoder for rendered slice buffers.
///
/// # Example
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use strip_slicer::encode::SliceEncoder;
///
/// let slice = RgbaImage::from_pixel(16, 16, Rgba([200, 10, 10, 255]));
/// let encoder = SliceEncoder::new();
///
/// let png = encoder.encode_png(&slice).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceEncoder {}

impl SliceEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode a slice losslessly as PNG.
    pub fn encode_png(&self, image: &RgbaImage) -> Result<Bytes, SliceError> {
        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| SliceError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }

    /// Encode a slice as JPEG at the given quality (clamped to 1-100).
    pub fn encode_jpeg(&self, image: &RgbaImage, quality: u8) -> Result<Bytes, SliceError> {
        let rgb: RgbImage = image.convert();
        self.encode_rgb_jpeg(&rgb, quality)
    }

    /// Encode an RGB buffer as JPEG.
    ///
    /// Lets callers that encode the same slice repeatedly convert once.
    pub fn encode_rgb_jpeg(&self, image: &RgbImage, quality: u8) -> Result<Bytes, SliceError> {
        let quality = clamp_quality(quality);

        let mut output = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
        encoder
            .encode_image(image)
            .map_err(|e| SliceError::Encode {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to the valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
