use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::SliceError;

/// A decoded source image.
///
/// Pixels are stored once as RGBA and shared read-only between slice
/// pipelines; cloning is cheap.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    format: Option<ImageFormat>,
}

impl SourceImage {
    /// Decode image bytes, sniffing the format from the content.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::Decode`] if the format is unknown, not enabled, or
    /// the data is corrupt.
    pub fn decode(bytes: &[u8]) -> Result<Self, SliceError> {
        let format = image::guess_format(bytes).map_err(|e| SliceError::Decode {
            message: format!("unrecognized image format: {}", e),
        })?;

        let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
            SliceError::Decode {
                message: e.to_string(),
            }
        })?;

        let pixels = decoded.to_rgba8();
        debug!(
            ?format,
            width = pixels.width(),
            height = pixels.height(),
            "Decoded source image"
        );

        Ok(Self {
            pixels: Arc::new(pixels),
            format: Some(format),
        })
    }

    /// Wrap an already decoded buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Number of live handles to the pixel buffer.
    #[cfg(test)]
    pub(crate) fn share_count(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }

    /// Format the image was decoded from, if it came from bytes.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }
}
