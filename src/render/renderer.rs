use image::imageops;
use image::RgbaImage;

use crate::error::SliceError;
use crate::geometry::SliceRegion;

use super::source::SourceImage;

/// Copy one horizontal band of the source into its own buffer.
///
/// The result has the full source width and `region.height()` rows; pixels
/// are copied 1:1 without resampling.
///
/// # Errors
///
/// - [`SliceError::EmptyRegion`] if `start_row >= end_row`
/// - [`SliceError::RegionOutOfBounds`] if `end_row` is past the image bottom
pub fn render_region(source: &SourceImage, region: &SliceRegion) -> Result<RgbaImage, SliceError> {
    if region.start_row >= region.end_row {
        return Err(SliceError::EmptyRegion {
            start: region.start_row,
            end: region.end_row,
        });
    }
    if region.end_row > source.height() {
        return Err(SliceError::RegionOutOfBounds {
            start: region.start_row,
            end: region.end_row,
            height: source.height(),
        });
    }

    let band = imageops::crop_imm(
        source.pixels(),
        0,
        region.start_row,
        source.width(),
        region.height(),
    );
    Ok(band.to_image())
}
