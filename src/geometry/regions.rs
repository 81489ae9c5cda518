//! Mapping of display-space boundary lines to source-space slice regions.

use serde::Serialize;

use crate::error::SliceError;

/// A horizontal band of the source image, `start_row..end_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SliceRegion {
    /// Slice index (0-based, top to bottom)
    pub index: usize,

    /// First source row of the band
    pub start_row: u32,

    /// One past the last source row of the band
    pub end_row: u32,
}

impl SliceRegion {
    pub fn new(index: usize, start_row: u32, end_row: u32) -> Self {
        Self {
            index,
            start_row,
            end_row,
        }
    }

    /// Number of rows, zero for empty or inverted bands.
    pub fn height(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row)
    }

    /// 1-based slice number used in file names.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Compute the source regions for a set of boundary lines.
///
/// `positions` are display-space y coordinates in any order; `scale` is the
/// source-to-display factor. The result holds `positions.len() + 1` regions
/// that partition `[0, image_height)`.
///
/// Positions are mapped to the nearest source row and clamped into the image.
///
/// # Errors
///
/// - [`SliceError::InvalidPosition`] for a non-finite position or a scale that
///   is not positive and finite
/// - [`SliceError::InvalidLayout`] for a zero image height
/// - [`SliceError::DegenerateRegion`] when two boundaries land on the same
///   row, or a boundary sits on the image edge, leaving a slice with no rows
pub fn compute_regions(
    positions: &[f64],
    scale: f64,
    image_height: u32,
) -> Result<Vec<SliceRegion>, SliceError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(SliceError::InvalidPosition { value: scale });
    }
    if image_height == 0 {
        return Err(SliceError::InvalidLayout {
            reason: "image height is zero".to_string(),
        });
    }
    if let Some(&bad) = positions.iter().find(|p| !p.is_finite()) {
        return Err(SliceError::InvalidPosition { value: bad });
    }

    let mut sorted = positions.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut boundaries = Vec::with_capacity(sorted.len() + 2);
    boundaries.push(0u32);
    boundaries.extend(
        sorted
            .iter()
            .map(|&y| to_source_row(y, scale, image_height)),
    );
    boundaries.push(image_height);

    boundaries
        .windows(2)
        .enumerate()
        .map(|(index, pair)| {
            let (start, end) = (pair[0], pair[1]);
            if start >= end {
                return Err(SliceError::DegenerateRegion { index, start, end });
            }
            Ok(SliceRegion::new(index, start, end))
        })
        .collect()
}

fn to_source_row(display_y: f64, scale: f64, image_height: u32) -> u32 {
    (display_y / scale).round().clamp(0.0, image_height as f64) as u32
}

// =============================================================================
// Tests
// =============================================================================
