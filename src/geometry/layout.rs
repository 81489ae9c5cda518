//! Display layout of the source image on the slicing canvas.
//!
//! The image is scaled uniformly to fit inside the canvas and anchored at the
//! top-left corner, so a display y coordinate maps to a source row by a single
//! division.

use serde::Serialize;

use crate::error::SliceError;

/// Default canvas width in display pixels.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1700.0;

/// Default canvas height in display pixels.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 8000.0;

// =============================================================================
// Canvas Size
// =============================================================================

/// Size of the display canvas in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    /// Create a canvas size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

// =============================================================================
// Display Layout
// =============================================================================

/// Placement of a source image on the canvas.
///
/// The scale factor is derived once, when the image is loaded, and is the same
/// on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayLayout {
    canvas: CanvasSize,
    image_width: u32,
    image_height: u32,
    scale: f64,
}

impl DisplayLayout {
    /// Fit an image of the given dimensions into the canvas.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidLayout`] if the canvas is not a positive
    /// finite size or the image has a zero dimension.
    pub fn fit(
        canvas: CanvasSize,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, SliceError> {
        if !canvas.is_usable() {
            return Err(SliceError::InvalidLayout {
                reason: format!("canvas {}x{} is not usable", canvas.width, canvas.height),
            });
        }
        if image_width == 0 || image_height == 0 {
            return Err(SliceError::InvalidLayout {
                reason: format!("image {}x{} has no pixels", image_width, image_height),
            });
        }

        let scale = (canvas.width / image_width as f64).min(canvas.height / image_height as f64);

        Ok(Self {
            canvas,
            image_width,
            image_height,
            scale,
        })
    }

    /// Source-to-display scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Source image `(width, height)` in pixels.
    pub fn image_dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Height the image occupies on the canvas.
    pub fn display_height(&self) -> f64 {
        self.image_height as f64 * self.scale
    }

    /// Width the image occupies on the canvas.
    pub fn display_width(&self) -> f64 {
        self.image_width as f64 * self.scale
    }
}

// =============================================================================
// Tests
// =============================================================================
