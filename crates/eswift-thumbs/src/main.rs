//! `eswift-thumbs` CLI - normalize listing photos already on disk.
//!
//! Runs the same crop-and-shrink the site applies after every save, for
//! backfilling images uploaded before normalization existed or after the
//! bounding box changed.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eswift_media::{BoundingBox, FilterType, NormalizeConfig, Normalizer};

/// Crop images to a centered square and shrink them to fit a bounding box, in place.
#[derive(Parser, Debug)]
#[command(name = "eswift-thumbs")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image files to normalize.
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Maximum output width in pixels [default: 500].
    #[arg(long, env = "ESWIFT_THUMB_MAX_WIDTH", value_name = "PX")]
    max_width: Option<u32>,

    /// Maximum output height in pixels [default: 500].
    #[arg(long, env = "ESWIFT_THUMB_MAX_HEIGHT", value_name = "PX")]
    max_height: Option<u32>,

    /// Resampling filter: nearest, bilinear or lanczos3.
    #[arg(long, value_name = "FILTER")]
    filter: Option<FilterType>,

    /// JPEG and WebP quality (1-100).
    #[arg(short = 'q', long, value_name = "INT", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Do not apply EXIF orientation before cropping.
    #[arg(long)]
    no_auto_orient: bool,

    /// JSON file with normalizer settings; flags override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report what would change.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("eswift_thumbs={log_level},eswift_media={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            tracing::error!("{failed} of {} file(s) failed", args.paths.len());
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Build the normalizer configuration from the optional config file and flags.
fn build_config(args: &Args) -> Result<NormalizeConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => NormalizeConfig::default(),
    };

    if let Some(width) = args.max_width {
        config.bounding_box.max_width = width;
    }
    if let Some(height) = args.max_height {
        config.bounding_box.max_height = height;
    }
    if let Some(filter) = args.filter {
        config.filter = filter;
    }
    if let Some(quality) = args.quality {
        config.quality = quality;
    }
    if args.no_auto_orient {
        config.auto_orient = false;
    }

    config.validate().context("Invalid normalizer configuration")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<NormalizeConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Process every path, returning how many failed.
fn run(args: &Args) -> Result<usize> {
    let config = build_config(args)?;
    let bounds = config.bounding_box;
    let normalizer = Normalizer::new(config).context("Failed to initialize normalizer")?;

    let mut failed = 0;
    for path in &args.paths {
        let outcome = if args.dry_run {
            dry_run(&normalizer, path, bounds)
        } else {
            normalize(&normalizer, path)
        };

        if let Err(err) = outcome {
            tracing::error!("{err:#}");
            failed += 1;
        }
    }

    Ok(failed)
}

fn dry_run(normalizer: &Normalizer, path: &Path, bounds: BoundingBox) -> Result<()> {
    let inspection = normalizer
        .inspect(path, bounds)
        .with_context(|| format!("Failed to inspect {}", path.display()))?;

    let (width, height) = inspection.dimensions;
    let (out_w, out_h) = inspection.plan.output_dimensions(width, height);
    let verdict = if inspection.needs_write() {
        "would rewrite"
    } else {
        "unchanged"
    };

    println!(
        "{}: {width}x{height} -> {out_w}x{out_h} ({verdict})",
        path.display()
    );
    Ok(())
}

fn normalize(normalizer: &Normalizer, path: &Path) -> Result<()> {
    let result = normalizer
        .normalize_default(path)
        .with_context(|| format!("Failed to normalize {}", path.display()))?;

    let report = &result.report;
    let (width, height) = report.original;
    let (out_w, out_h) = report.output;
    let verdict = if report.written {
        "rewritten"
    } else {
        "unchanged"
    };

    println!(
        "{}: {width}x{height} -> {out_w}x{out_h} ({verdict})",
        path.display()
    );
    Ok(())
}
