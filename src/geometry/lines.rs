//! Boundary lines in display space.

use serde::Serialize;

use crate::error::SliceError;

/// Horizontal boundary lines separating slices.
///
/// A set of lines for `n` slices always holds `n - 1` positions. Positions are
/// stored in the order the lines were created; dragging can put them out of
/// order, so consumers sort before use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryLines {
    positions: Vec<f64>,
    extent: f64,
}

impl BoundaryLines {
    /// Create `slice_count - 1` lines evenly spaced over `[0, extent]`.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidSliceCount`] when `slice_count` is zero and
    /// [`SliceError::InvalidPosition`] when `extent` is negative or not finite.
    pub fn evenly_spaced(slice_count: usize, extent: f64) -> Result<Self, SliceError> {
        if slice_count == 0 {
            return Err(SliceError::InvalidSliceCount { count: slice_count });
        }
        if !extent.is_finite() || extent < 0.0 {
            return Err(SliceError::InvalidPosition { value: extent });
        }

        Ok(Self::spaced(slice_count, extent))
    }

    /// Evenly spaced lines for arguments already known to be valid.
    pub(crate) fn spaced(slice_count: usize, extent: f64) -> Self {
        let spacing = extent / slice_count.max(1) as f64;
        let positions = (1..slice_count).map(|i| spacing * i as f64).collect();

        Self { positions, extent }
    }

    /// Number of slices these lines produce.
    pub fn slice_count(&self) -> usize {
        self.positions.len() + 1
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Line positions in creation order.
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Height of the span the lines can move in.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Drag a line to a new vertical position.
    ///
    /// The position is clamped to `[0, extent]`. Returns the stored value.
    pub fn move_line(&mut self, index: usize, y: f64) -> Result<f64, SliceError> {
        if !y.is_finite() {
            return Err(SliceError::InvalidPosition { value: y });
        }
        let count = self.positions.len();
        let slot = self
            .positions
            .get_mut(index)
            .ok_or(SliceError::LineIndexOutOfRange { index, count })?;

        *slot = y.clamp(0.0, self.extent);
        Ok(*slot)
    }

    /// Line positions sorted top to bottom.
    pub fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.positions.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }
}

// =============================================================================
// Tests
// =============================================================================
