//! Command-line front end for masked image comparison.
//!
//! # Usage
//!
//! ```bash
//! # Compare two renderings
//! imagecompare expected.png actual.png
//!
//! # Ignore the top 10% of every page and keep screenshots of differences
//! imagecompare expected.png actual.png \
//!     --mask '{"type": "area", "location": "top", "percent": 10}' \
//!     --output-dir ./results
//!
//! # Accept the candidate as the new reference if none exists yet
//! imagecompare baseline/page.png actual.png --reference-run
//! ```
//!
//! Exit status: 0 when the images are equal (or a reference was created),
//! 1 when they differ, 2 for any other error.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use imagecompare_core::{
    CompareConfig, CompareError, CompareRequest, ImageComparator, ScreenshotDirectory,
    ScreenshotFormat, Verdict,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Compare a candidate image against a reference, ignoring masked regions
#[derive(Parser, Debug)]
#[command(name = "imagecompare")]
#[command(version, about, long_about = None)]
struct Args {
    /// Reference (expected) image
    reference: PathBuf,

    /// Candidate (actual) image
    candidate: PathBuf,

    /// JSON file with regions to mask
    #[arg(long, conflicts_with = "mask")]
    mask_file: Option<PathBuf>,

    /// Inline JSON with regions to mask
    #[arg(long)]
    mask: Option<String>,

    /// Dissimilarity above which a page counts as different (0-1)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Resolution used for mm/cm mask coordinates
    #[arg(long)]
    dpi: Option<u32>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the screenshots/ folder
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Copy the candidate to the reference path if the reference is missing
    #[arg(long)]
    reference_run: bool,

    /// Save a side-by-side screenshot of every page
    #[arg(long)]
    take_screenshots: bool,

    /// Also save the difference map and mask of differing pages
    #[arg(long)]
    show_diff: bool,

    /// Screenshot encoding
    #[arg(long, value_enum)]
    screenshot_format: Option<FormatArg>,

    /// Worker threads for page comparison (default: one per core)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Prefix for screenshot names, for parallel runs sharing an output directory
    #[arg(long)]
    queue_index: Option<String>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Jpg,
    Png,
}

impl From<FormatArg> for ScreenshotFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpg => Self::Jpg,
            FormatArg::Png => Self::Png,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let differ = e
                .downcast_ref::<CompareError>()
                .is_some_and(CompareError::is_verdict_failure);
            eprintln!("Error: {e:#}");
            if differ {
                ExitCode::from(1)
            } else {
                ExitCode::from(2)
            }
        }
    }
}

fn build_config(args: &Args) -> Result<CompareConfig> {
    let mut config = match &args.config {
        Some(path) => CompareConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => CompareConfig::default(),
    };
    config = config.with_env_overrides()?;

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(dpi) = args.dpi {
        config.dpi = dpi;
    }
    if let Some(format) = args.screenshot_format {
        config.screenshot_format = format.into();
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }
    config.reference_run |= args.reference_run;
    config.take_screenshots |= args.take_screenshots;
    config.show_diff |= args.show_diff;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = build_config(args)?;
    log::debug!("Configuration: {config:?}");

    let mut sink = ScreenshotDirectory::new(&args.output_dir).with_format(config.screenshot_format);
    if let Some(index) = &args.queue_index {
        sink = sink.with_queue_index(index.clone());
    }
    let comparator = ImageComparator::new(config)?.with_sink(Arc::new(sink));

    let mut request = CompareRequest::new(&args.reference, &args.candidate);
    if let Some(path) = &args.mask_file {
        request = request.with_mask_file(path);
    } else if let Some(json) = &args.mask {
        request = request.with_mask_json(json.clone());
    }

    match comparator.compare(&request)? {
        Verdict::Equal(report) => {
            for warning in &report.mask_warnings {
                println!("Warning: {warning}");
            }
            for page in &report.pages {
                println!("page {}: dissimilarity {:.6}", page.page, page.score);
            }
            println!("The compared images are equal");
        }
        Verdict::ReferenceCreated(path) => {
            println!("Reference created: {}", path.display());
        }
    }
    Ok(())
}
