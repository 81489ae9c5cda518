//! Slice encoding.
//!
//! - [`SliceEncoder`]: lossless PNG and fixed-quality JPEG encoding
//! - [`SizeBoundedCompressor`]: downward JPEG quality walk under a byte ceiling
//! - [`QualitySearch`]: start, step and floor of that walk

mod compressor;
mod encoder;

pub use compressor::{
    CompressedImage, QualitySearch, SizeBoundedCompressor, DEFAULT_QUALITY_FLOOR,
    DEFAULT_QUALITY_START, DEFAULT_QUALITY_STEP, DEFAULT_SIZE_CEILING,
};
pub use encoder::{
    clamp_quality, is_valid_quality, SliceEncoder, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
