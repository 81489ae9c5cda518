//! Size-bounded compression integration tests.
//!
//! Tests verify:
//! - A slice whose PNG exceeds 400 KiB is compressed toward the ceiling
//! - The best-effort floor result is returned when the ceiling is unreachable
//! - JPEG size does not grow as quality drops

use strip_slicer::encode::{
    QualitySearch, SizeBoundedCompressor, SliceEncoder, DEFAULT_QUALITY_FLOOR,
    DEFAULT_SIZE_CEILING,
};
use strip_slicer::export::{ExportOptions, Exporter, SliceFormat};
use strip_slicer::geometry::SliceRegion;
use strip_slicer::render::SourceImage;

use super::test_utils::{gradient_image, is_jpeg, noise_image};

// =============================================================================
// Ceiling Scenario
// =============================================================================

#[test]
fn test_large_png_slice_goes_through_compressor() {
    // ~600 KiB of raw RGBA noise; PNG cannot shrink it below 400 KiB
    let band = noise_image(400, 384, 11);
    let encoder = SliceEncoder::new();
    let png = encoder.encode_png(&band).unwrap();
    assert!(png.len() > DEFAULT_SIZE_CEILING);

    let result = SizeBoundedCompressor::new()
        .compress(&band, DEFAULT_SIZE_CEILING)
        .unwrap();

    assert!(is_jpeg(&result.data));
    if result.met_target {
        assert!(result.data.len() <= DEFAULT_SIZE_CEILING);
    } else {
        assert_eq!(result.quality, DEFAULT_QUALITY_FLOOR);
        assert_eq!(
            result.data.len(),
            encoder.encode_jpeg(&band, DEFAULT_QUALITY_FLOOR).unwrap().len()
        );
    }
}

#[test]
fn test_exporter_names_compressed_slice_jpg() {
    let source = SourceImage::from_rgba(noise_image(400, 384, 5));
    let exporter = Exporter::new(ExportOptions::default()).unwrap();

    let artifact = exporter
        .export_slice(&source, &SliceRegion::new(0, 0, 384))
        .unwrap();

    assert_eq!(artifact.format, SliceFormat::Jpeg);
    assert_eq!(artifact.file_name(), "slice-1.jpg");
    if artifact.within_ceiling {
        assert!(artifact.size() <= DEFAULT_SIZE_CEILING);
    }
}

#[test]
fn test_unreachable_ceiling_is_best_effort() {
    let band = noise_image(96, 96, 21);
    let result = SizeBoundedCompressor::new().compress(&band, 100).unwrap();

    assert!(!result.met_target);
    assert_eq!(result.quality, DEFAULT_QUALITY_FLOOR);
    assert!(result.data.len() > 100);
}

#[test]
fn test_custom_search_stops_at_its_floor() {
    let search = QualitySearch::new(90, 10, 50).unwrap();
    let compressor = SizeBoundedCompressor::with_search(search).unwrap();

    let result = compressor.compress(&noise_image(64, 64, 4), 1).unwrap();
    assert_eq!(result.quality, 50);
    assert_eq!(result.attempts, 5);
}

#[test]
fn test_smooth_slice_meets_ceiling_at_high_quality() {
    let band = gradient_image(256, 256);
    let result = SizeBoundedCompressor::new()
        .compress(&band, DEFAULT_SIZE_CEILING)
        .unwrap();

    assert!(result.met_target);
    assert_eq!(result.quality, 100);
}

// =============================================================================
// Monotonicity
// =============================================================================

#[test]
fn test_jpeg_size_non_increasing_with_quality() {
    let encoder = SliceEncoder::new();
    for seed in [1u32, 2, 3] {
        let band = noise_image(160, 120, seed);
        let sizes: Vec<usize> = [100u8, 85, 70, 55]
            .iter()
            .map(|&q| encoder.encode_jpeg(&band, q).unwrap().len())
            .collect();

        for pair in sizes.windows(2) {
            assert!(pair[0] >= pair[1], "seed {}: {:?}", seed, sizes);
        }
    }
}
