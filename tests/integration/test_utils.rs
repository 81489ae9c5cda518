//! Test utilities for integration tests.
//!
//! Synthetic image generators, an in-memory download target, and helpers
//! for reading archives back.

use std::io::{Cursor, Read};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use tokio::sync::RwLock;
use zip::ZipArchive;

use strip_slicer::error::SliceError;
use strip_slicer::export::DownloadTarget;

// =============================================================================
// Image Generators
// =============================================================================

/// Smooth vertical gradient; compresses well as PNG.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = ((y * 255) / height.max(1)) as u8;
        Rgba([v, (x % 256) as u8, 255 - v, 255])
    })
}

/// Pseudo-random noise; PNG barely compresses it.
pub fn noise_image(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut state = seed.max(1);
    RgbaImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgba([r, g, b, 255])
    })
}

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    buf
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.encode_image(&img).unwrap();
    buf
}

// =============================================================================
// Memory Download Target
// =============================================================================

/// A download target that keeps every delivered archive in memory.
#[derive(Clone, Default)]
pub struct MemoryDownload {
    deliveries: Arc<RwLock<Vec<(String, Bytes)>>>,
}

impl MemoryDownload {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<(String, Bytes)> {
        self.deliveries.read().await.clone()
    }
}

#[async_trait]
impl DownloadTarget for MemoryDownload {
    async fn deliver(&self, file_name: &str, data: Bytes) -> Result<(), SliceError> {
        self.deliveries
            .write()
            .await
            .push((file_name.to_string(), data));
        Ok(())
    }
}

// =============================================================================
// Archive Helpers
// =============================================================================

/// File entries of an archive (directories skipped), in archive order.
pub fn archive_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        if file.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        entries.push((file.name().to_string(), contents));
    }
    entries
}

/// Check that bytes start with the PNG signature.
pub fn is_png(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}

/// Check that bytes look like a complete JPEG stream.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}
