//! strip-slicer - Split tall images into size-bounded horizontal slices.
//!
//! This binary wires the command line to a slicing session and writes the
//! archive to disk.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strip_slicer::{
    config::{Cli, Command, ExportConfig, LayoutArgs, OutputFormat, PlanConfig},
    export::{Exporter, FileDownload},
    session::SlicerSession,
    SliceError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Export(config) => run_export(config).await,
        Command::Plan(config) => run_plan(config).await,
    }
}

// =============================================================================
// Export Command
// =============================================================================

async fn run_export(config: ExportConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let session = match open_session(&config.layout).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to prepare {}: {}", config.layout.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let exporter = match Exporter::new(config.export_options()) {
        Ok(exporter) => exporter,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let target = FileDownload::new(&config.output);
    let bundle = match session.export_to(&exporter, &target).await {
        Ok(bundle) => bundle,
        Err(e) => {
            error!("Export failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for slice in &bundle.slices {
        let quality = slice
            .quality
            .map(|q| format!(" q={}", q))
            .unwrap_or_default();
        info!(
            "  {:<14} rows {:>6}..{:<6} {:>9} bytes{}",
            slice.file_name, slice.start_row, slice.end_row, slice.size, quality
        );
    }
    for slice in bundle.oversized() {
        warn!(
            "  {} is {} bytes, above the {} byte ceiling",
            slice.file_name, slice.size, config.max_slice_bytes
        );
    }
    info!(
        "Archive written to {}",
        target.path_for(&bundle.file_name).display()
    );

    if config.format == OutputFormat::Json {
        match serde_json::to_string_pretty(&bundle) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Plan Command
// =============================================================================

async fn run_plan(config: PlanConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let session = match open_session(&config.layout).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let regions = match session.regions() {
        Ok(regions) => regions,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let Some(layout) = session.layout() else {
        eprintln!("Error: {}", SliceError::NoImage);
        return ExitCode::FAILURE;
    };
    let (width, height) = layout.image_dimensions();

    match config.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "input": config.layout.input.display().to_string(),
                "width": width,
                "height": height,
                "canvas": layout.canvas(),
                "scale": layout.scale(),
                "lines": session.lines().sorted(),
                "regions": regions,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        OutputFormat::Text => {
            println!("{} ({}x{})", config.layout.input.display(), width, height);
            println!("Display scale: {:.4}", layout.scale());
            println!("─────────────────────────────────");
            for region in &regions {
                println!(
                    "  slice {:<4} rows {:>6}..{:<6} ({} px)",
                    region.number(),
                    region.start_row,
                    region.end_row,
                    region.height()
                );
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the input image and place the lines requested on the command line.
async fn open_session(layout: &LayoutArgs) -> Result<SlicerSession, SliceError> {
    let bytes = tokio::fs::read(&layout.input).await?;

    let mut session = SlicerSession::new(layout.canvas());
    if !session.load_image(&bytes)? {
        return Err(SliceError::NoImage);
    }
    session.set_slice_count(layout.slices)?;
    if !layout.lines.is_empty() {
        session.set_lines(&layout.lines)?;
    }

    Ok(session)
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so JSON reports on stdout stay parseable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "strip_slicer=debug"
    } else {
        "strip_slicer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
