use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while laying out, rendering, encoding or exporting slices
#[derive(Debug, Clone, Error)]
pub enum SliceError {
    /// Source bytes could not be decoded as an image
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// A slice could not be encoded
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// The archive could not be written
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// File system error while delivering the bundle
    #[error("I/O error: {0}")]
    Io(String),

    /// Slice count must be at least one
    #[error("Invalid slice count: {count} (must be at least 1)")]
    InvalidSliceCount { count: usize },

    /// Canvas or image dimensions cannot produce a display scale
    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    /// A line index that does not exist was addressed
    #[error("Line index {index} out of range ({count} lines)")]
    LineIndexOutOfRange { index: usize, count: usize },

    /// A full set of line positions did not match the number of lines
    #[error("Expected {expected} line position(s), got {actual}")]
    LineCountMismatch { expected: usize, actual: usize },

    /// A line position or scale factor is NaN or infinite
    #[error("Invalid position: {value}")]
    InvalidPosition { value: f64 },

    /// Two boundaries collapsed onto the same row, or crossed after mapping
    #[error("Slice {index} has no height after mapping: rows {start}..{end}")]
    DegenerateRegion { index: usize, start: u32, end: u32 },

    /// The renderer was asked for a band with no rows
    #[error("Empty region: rows {start}..{end}")]
    EmptyRegion { start: u32, end: u32 },

    /// The renderer was asked for rows past the bottom of the image
    #[error("Region rows {start}..{end} exceed image height {height}")]
    RegionOutOfBounds { start: u32, end: u32, height: u32 },

    /// An operation that needs an image ran before one was loaded
    #[error("No image loaded")]
    NoImage,

    /// Another export holds the session
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Quality search parameters are inconsistent
    #[error("Invalid quality search: {reason}")]
    InvalidQualitySearch { reason: String },

    /// A slice pipeline task panicked or was cancelled
    #[error("Slice task failed: {message}")]
    Task { message: String },

    /// Slice work stopped because the export was abandoned
    #[error("Slice work cancelled")]
    Cancelled,

    /// The export did not finish within the configured deadline
    #[error("Export timed out after {limit:?}")]
    Timeout { limit: Duration },
}

impl From<std::io::Error> for SliceError {
    fn from(err: std::io::Error) -> Self {
        SliceError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for SliceError {
    fn from(err: zip::result::ZipError) -> Self {
        SliceError::Archive {
            message: err.to_string(),
        }
    }
}
