//! Export pipeline integration tests.
//!
//! Tests verify:
//! - The archive holds exactly one entry per slice, uniquely numbered 1..N
//! - Entries decode back to the expected slice dimensions
//! - Oversized PNG slices switch to JPEG
//! - Failed or timed-out exports deliver nothing
//! - The session refuses concurrent exports

use std::collections::HashSet;
use std::time::{Duration, Instant};

use strip_slicer::cancel::CancelFlag;
use strip_slicer::encode::SizeBoundedCompressor;
use strip_slicer::error::SliceError;
use strip_slicer::export::{ExportOptions, Exporter, FileDownload, SliceFormat};
use strip_slicer::geometry::{CanvasSize, SliceRegion};
use strip_slicer::render::SourceImage;
use strip_slicer::session::SlicerSession;

use super::test_utils::{
    archive_entries, encode_png, gradient_image, is_jpeg, is_png, noise_image, MemoryDownload,
};

fn session_with(image: &image::RgbaImage, slices: usize) -> SlicerSession {
    let mut session = SlicerSession::new(CanvasSize::new(
        image.width() as f64,
        image.height() as f64,
    ));
    session.load_image(&encode_png(image)).unwrap();
    session.set_slice_count(slices).unwrap();
    session
}

// =============================================================================
// Archive Contents
// =============================================================================

#[tokio::test]
async fn test_archive_has_one_entry_per_slice() {
    for n in [1usize, 2, 5, 8] {
        let session = session_with(&gradient_image(120, 800), n);
        let exporter = Exporter::new(ExportOptions::default()).unwrap();
        let target = MemoryDownload::new();

        let bundle = session.export_to(&exporter, &target).await.unwrap();

        let deliveries = target.deliveries().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "sliced-images.zip");
        assert_eq!(deliveries[0].1, bundle.data);

        let entries = archive_entries(&bundle.data);
        assert_eq!(entries.len(), n);

        let names: HashSet<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names.len(), n, "duplicate entry names");
        for i in 1..=n {
            assert!(names.contains(format!("sliced-images/slice-{}.png", i).as_str()));
        }
    }
}

#[tokio::test]
async fn test_entries_are_in_slice_order_and_decode() {
    let session = session_with(&gradient_image(90, 600), 3);
    let exporter = Exporter::new(ExportOptions::default()).unwrap();

    let bundle = session.export(&exporter).await.unwrap();
    let entries = archive_entries(&bundle.data);

    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "sliced-images/slice-1.png",
            "sliced-images/slice-2.png",
            "sliced-images/slice-3.png"
        ]
    );

    for (_, data) in &entries {
        assert!(is_png(data));
        let decoded = image::load_from_memory(data).unwrap();
        assert_eq!(decoded.width(), 90);
        assert_eq!(decoded.height(), 200);
    }
}

#[tokio::test]
async fn test_slice_pixels_match_source() {
    let source_image = gradient_image(40, 300);
    let session = session_with(&source_image, 2);
    let exporter = Exporter::new(ExportOptions::default()).unwrap();

    let bundle = session.export(&exporter).await.unwrap();
    let entries = archive_entries(&bundle.data);

    let second = image::load_from_memory(&entries[1].1).unwrap().to_rgba8();
    assert_eq!(second.height(), 150);
    for y in 0..150 {
        assert_eq!(second.get_pixel(7, y), source_image.get_pixel(7, y + 150));
    }
}

// =============================================================================
// Format Selection
// =============================================================================

#[tokio::test]
async fn test_oversized_slice_becomes_jpeg() {
    let session = session_with(&noise_image(128, 256, 7), 2);
    let exporter = Exporter::new(ExportOptions::default().with_size_ceiling(20 * 1024)).unwrap();

    let bundle = session.export(&exporter).await.unwrap();
    let entries = archive_entries(&bundle.data);

    assert_eq!(entries.len(), 2);
    for (i, (name, data)) in entries.iter().enumerate() {
        assert_eq!(name, &format!("sliced-images/slice-{}.jpg", i + 1));
        assert!(is_jpeg(data));
    }
    for summary in &bundle.slices {
        assert_eq!(summary.format, SliceFormat::Jpeg);
        assert!(summary.quality.is_some());
        if summary.within_ceiling {
            assert!(summary.size <= 20 * 1024);
        } else {
            assert_eq!(summary.quality, Some(70));
        }
    }
}

#[tokio::test]
async fn test_mixed_formats() {
    // Top half smooth, bottom half noise
    let mut image = gradient_image(128, 256);
    let noise = noise_image(128, 128, 99);
    image::imageops::replace(&mut image, &noise, 0, 128);

    let session = session_with(&image, 2);
    let exporter = Exporter::new(ExportOptions::default().with_size_ceiling(16 * 1024)).unwrap();

    let bundle = session.export(&exporter).await.unwrap();
    let formats: Vec<SliceFormat> = bundle.slices.iter().map(|s| s.format).collect();
    assert_eq!(formats, vec![SliceFormat::Png, SliceFormat::Jpeg]);
    assert_eq!(bundle.slices[0].file_name, "slice-1.png");
    assert_eq!(bundle.slices[1].file_name, "slice-2.jpg");
}

// =============================================================================
// Failure Policy
// =============================================================================

#[tokio::test]
async fn test_failed_slice_delivers_nothing() {
    let source = SourceImage::from_rgba(gradient_image(30, 90));
    let regions = vec![
        SliceRegion::new(0, 0, 30),
        SliceRegion::new(1, 30, 120),
        SliceRegion::new(2, 60, 90),
    ];
    let exporter = Exporter::new(ExportOptions::default()).unwrap();
    let target = MemoryDownload::new();

    let result = exporter.export_to(&source, &regions, &target).await;

    assert!(matches!(
        result,
        Err(SliceError::RegionOutOfBounds { end: 120, .. })
    ));
    assert!(target.deliveries().await.is_empty());
}

#[tokio::test]
async fn test_timeout_delivers_nothing() {
    let source = SourceImage::from_rgba(noise_image(600, 600, 3));
    let regions = vec![
        SliceRegion::new(0, 0, 200),
        SliceRegion::new(1, 200, 400),
        SliceRegion::new(2, 400, 600),
    ];
    let exporter = Exporter::new(
        ExportOptions::default()
            .with_size_ceiling(1)
            .with_timeout(Duration::from_millis(1)),
    )
    .unwrap();
    let target = MemoryDownload::new();

    let result = exporter.export_to(&source, &regions, &target).await;

    match result {
        Err(SliceError::Timeout { limit }) => assert_eq!(limit, Duration::from_millis(1)),
        other => panic!("expected timeout, got {:?}", other.map(|b| b.slices)),
    }
    assert!(target.deliveries().await.is_empty());
}

#[tokio::test]
async fn test_timeout_stops_compression() {
    let image = noise_image(600, 600, 8);
    let band = image::imageops::crop_imm(&image, 0, 0, 600, 300).to_image();

    // One uninterrupted 100 -> 70 walk over a single slice
    let started = Instant::now();
    let full = SizeBoundedCompressor::new().compress(&band, 1).unwrap();
    let full_walk = started.elapsed();
    assert_eq!(full.attempts, 16);

    let source = SourceImage::from_rgba(image);
    let regions = vec![SliceRegion::new(0, 0, 300), SliceRegion::new(1, 300, 600)];
    let exporter = Exporter::new(
        ExportOptions::default()
            .with_size_ceiling(1)
            .with_timeout(Duration::from_millis(5)),
    )
    .unwrap();
    let cancel = CancelFlag::new();

    let started = Instant::now();
    let result = exporter
        .export_cancellable(&source, &regions, &cancel)
        .await;
    let cancelled_run = started.elapsed();

    assert!(matches!(result, Err(SliceError::Timeout { .. })));
    assert!(cancel.is_cancelled());
    // Pipelines are joined before the error is returned; they stop after at
    // most the attempt in flight instead of finishing their walks
    assert!(
        cancelled_run < full_walk,
        "cancelled export took {:?}, a full walk takes {:?}",
        cancelled_run,
        full_walk
    );
}

#[tokio::test]
async fn test_cancelled_session_export() {
    let session = session_with(&gradient_image(60, 180), 3);
    let exporter = Exporter::new(ExportOptions::default()).unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let job = session.prepare_export().unwrap();
    let result = exporter
        .export_cancellable(job.source(), job.regions(), &cancel)
        .await;

    assert!(matches!(result, Err(SliceError::Cancelled)));
}

#[tokio::test]
async fn test_session_rejects_concurrent_export() {
    let mut session = session_with(&gradient_image(50, 100), 2);
    let exporter = Exporter::new(ExportOptions::default()).unwrap();

    let job = session.prepare_export().unwrap();
    assert!(matches!(
        session.export(&exporter).await,
        Err(SliceError::ExportInProgress)
    ));
    assert!(matches!(
        session.load_image(&encode_png(&gradient_image(10, 10))),
        Err(SliceError::ExportInProgress)
    ));

    let bundle = job.run(&exporter).await.unwrap();
    assert_eq!(bundle.slices.len(), 2);

    assert!(!session.is_exporting());
    assert!(session.set_slice_count(4).is_ok());
}

// =============================================================================
// File Download
// =============================================================================

#[tokio::test]
async fn test_file_download_writes_archive() {
    let dir = std::env::temp_dir().join(format!("strip-slicer-export-{}", std::process::id()));
    let session = session_with(&gradient_image(60, 180), 3);
    let exporter = Exporter::new(ExportOptions::default()).unwrap();
    let target = FileDownload::new(&dir);

    let bundle = session.export_to(&exporter, &target).await.unwrap();

    let written = tokio::fs::read(dir.join("sliced-images.zip")).await.unwrap();
    assert_eq!(written, bundle.data.to_vec());
    assert_eq!(archive_entries(&written).len(), 3);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
