//! Command-line configuration for strip-slicer.
//!
//! This module provides:
//! - Subcommands via clap (`export`, `plan`)
//! - Environment variables with `SLICER_` prefix
//! - Defaults matching the browser slicer (1700x8000 canvas, 400 KiB ceiling,
//!   JPEG quality 100 → 70 in steps of 2)
//!
//! # Environment Variables
//!
//! - `SLICER_SLICES` - Number of slices (default: 3)
//! - `SLICER_CANVAS_WIDTH` - Canvas width in display pixels (default: 1700)
//! - `SLICER_CANVAS_HEIGHT` - Canvas height in display pixels (default: 8000)
//! - `SLICER_OUTPUT` - Output directory for the archive (default: .)
//! - `SLICER_MAX_SLICE_BYTES` - Byte ceiling per slice (default: 409600)
//! - `SLICER_QUALITY_START` - First JPEG quality tried (default: 100)
//! - `SLICER_QUALITY_STEP` - JPEG quality decrement (default: 2)
//! - `SLICER_QUALITY_FLOOR` - Lowest JPEG quality tried (default: 70)
//! - `SLICER_TIMEOUT_SECS` - Abort the export after this many seconds
//! - `SLICER_ARCHIVE_NAME` - Archive file name (default: sliced-images.zip)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::encode::{
    QualitySearch, DEFAULT_QUALITY_FLOOR, DEFAULT_QUALITY_START, DEFAULT_QUALITY_STEP,
    DEFAULT_SIZE_CEILING,
};
use crate::export::{ExportOptions, DEFAULT_ARCHIVE_NAME};
use crate::geometry::{CanvasSize, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::session::DEFAULT_SLICE_COUNT;

// =============================================================================
// Default Values
// =============================================================================

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Largest slice count accepted from the command line.
pub const MAX_SLICE_COUNT: usize = 1000;

// =============================================================================
// CLI Arguments
// =============================================================================

/// strip-slicer - Split tall images into size-bounded horizontal slices.
#[derive(Parser, Debug, Clone)]
#[command(name = "strip-slicer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Slice an image and write the archive.
    Export(ExportConfig),

    /// Show the layout and slice regions without encoding anything.
    Plan(PlanConfig),
}

// =============================================================================
// Shared Layout Arguments
// =============================================================================

/// Input image and line placement, shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct LayoutArgs {
    /// Image file to slice.
    pub input: PathBuf,

    /// Number of slices.
    #[arg(short, long, default_value_t = DEFAULT_SLICE_COUNT, env = "SLICER_SLICES")]
    pub slices: usize,

    /// Boundary line position in display pixels (repeat once per line).
    ///
    /// When given, exactly `slices - 1` values are required; otherwise lines
    /// are evenly spaced.
    #[arg(short, long = "line", value_name = "Y")]
    pub lines: Vec<f64>,

    /// Canvas width in display pixels.
    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH, env = "SLICER_CANVAS_WIDTH")]
    pub canvas_width: f64,

    /// Canvas height in display pixels.
    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT, env = "SLICER_CANVAS_HEIGHT")]
    pub canvas_height: f64,
}

impl LayoutArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.slices == 0 || self.slices > MAX_SLICE_COUNT {
            return Err(format!("slices must be between 1 and {}", MAX_SLICE_COUNT));
        }

        if !self.lines.is_empty() && self.lines.len() != self.slices - 1 {
            return Err(format!(
                "{} slice(s) need {} --line value(s), got {}",
                self.slices,
                self.slices - 1,
                self.lines.len()
            ));
        }
        if self.lines.iter().any(|y| !y.is_finite()) {
            return Err("line positions must be finite numbers".to_string());
        }

        let canvas_ok = |v: f64| v.is_finite() && v > 0.0;
        if !canvas_ok(self.canvas_width) || !canvas_ok(self.canvas_height) {
            return Err("canvas width and height must be positive".to_string());
        }

        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

/// How a command reports its result on stdout.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Text,
    /// JSON document
    Json,
}

// =============================================================================
// Export Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ExportConfig {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Directory the archive is written to.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "SLICER_OUTPUT")]
    pub output: PathBuf,

    /// Archive file name.
    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME, env = "SLICER_ARCHIVE_NAME")]
    pub archive_name: String,

    /// Byte ceiling per slice; larger PNGs are re-encoded as JPEG.
    #[arg(long, default_value_t = DEFAULT_SIZE_CEILING, env = "SLICER_MAX_SLICE_BYTES")]
    pub max_slice_bytes: usize,

    /// First JPEG quality tried (1-100).
    #[arg(long, default_value_t = DEFAULT_QUALITY_START, env = "SLICER_QUALITY_START")]
    pub quality_start: u8,

    /// JPEG quality decrement between attempts.
    #[arg(long, default_value_t = DEFAULT_QUALITY_STEP, env = "SLICER_QUALITY_STEP")]
    pub quality_step: u8,

    /// Lowest JPEG quality tried (1-100).
    #[arg(long, default_value_t = DEFAULT_QUALITY_FLOOR, env = "SLICER_QUALITY_FLOOR")]
    pub quality_floor: u8,

    /// Abort the export after this many seconds.
    #[arg(long, env = "SLICER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Report format; `json` prints the archive summary to stdout.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ExportConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()?;

        if self.max_slice_bytes == 0 {
            return Err("max_slice_bytes must be greater than 0".to_string());
        }

        self.quality_search().validate().map_err(|e| e.to_string())?;

        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        let name = self.archive_name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err("archive_name must be a plain file name".to_string());
        }

        Ok(())
    }

    pub fn quality_search(&self) -> QualitySearch {
        QualitySearch {
            start: self.quality_start,
            step: self.quality_step,
            floor: self.quality_floor,
        }
    }

    /// Build exporter options (call validate() first).
    pub fn export_options(&self) -> ExportOptions {
        let mut options = ExportOptions::default()
            .with_size_ceiling(self.max_slice_bytes)
            .with_search(self.quality_search())
            .with_archive_name(self.archive_name.trim());

        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }

        options
    }
}

// =============================================================================
// Plan Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.layout.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
