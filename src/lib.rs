//! dicomcompare: compare DICOM study exports.
//!
//! One export is the baseline; every other export is compared against it,
//! instance by instance, either on metadata tags or on decoded pixel data.
//! Results are scored per file, ranked across files and written as CSV or
//! JSON reports.
//!
//! # Modules
//!
//! - [`model`]: Record model (exports, instances, tag maps, lazy pixels)
//! - [`loader`]: Zip/directory discovery and DICOM parsing
//! - [`matching`]: Pairing instances between two exports
//! - [`tags`]: Metadata tag comparison
//! - [`image`]: Pixel comparison
//! - [`summary`]: Scoring, grades and the cross-file tag ranking
//! - [`compare`]: Run orchestration over all exports
//! - [`report`]: CSV/JSON report rows
//! - [`config`]: YAML configuration
//! - [`error`]: Error types for dicomcompare operations

pub mod compare;
pub mod config;
pub mod error;
pub mod image;
pub mod inspect;
pub mod loader;
pub mod matching;
pub mod model;
pub mod report;
pub mod summary;
pub mod tags;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::compare::{Cancellation, ScoringOptions};
use crate::config::CompareConfig;
use crate::loader::{load_export, WorkDir};
use crate::model::Export;

pub use error::DicomCompareError;

/// The dicomcompare CLI application.
#[derive(Parser)]
#[command(name = "dicomcompare")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compare metadata tags of every export against the first.
    Compare(CompareArgs),
    /// Compare pixel data of every export against the first.
    Image(ImageArgs),
    /// Show what the loader finds in each export.
    Inspect(InspectArgs),
}

/// Terminal output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments shared by the comparison subcommands.
#[derive(clap::Args)]
struct CommonArgs {
    /// Export to load (zip, directory or DICOM file); the first is the
    /// baseline.
    #[arg(short = 'f', long = "file", required = true)]
    files: Vec<PathBuf>,

    /// Write a report to this path (.csv or .json).
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Terminal output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the compare subcommand.
#[derive(clap::Args)]
struct CompareArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Additional tag to exclude (keyword or `(gggg,eeee)`); repeatable.
    #[arg(long)]
    exclude: Vec<String>,

    /// Do not exclude the tags that routinely differ between exports.
    #[arg(long)]
    no_default_exclusions: bool,
}

/// Arguments for the image subcommand.
#[derive(clap::Args)]
struct ImageArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Absolute per-pixel tolerance.
    #[arg(short, long, allow_negative_numbers = true)]
    tolerance: Option<f64>,

    /// Apply rescale slope/intercept and windowing before comparing.
    #[arg(long, overrides_with = "no_normalize")]
    normalize: bool,

    /// Compare stored values as they are.
    #[arg(long, overrides_with = "normalize")]
    no_normalize: bool,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Export to inspect; repeatable.
    #[arg(short = 'f', long = "file", required = true)]
    files: Vec<PathBuf>,

    /// Number of instances listed per export.
    #[arg(long, default_value_t = 5)]
    sample: usize,

    /// Terminal output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Run the dicomcompare CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DicomCompareError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Compare(args)) => run_compare(args),
        Some(Commands::Image(args)) => run_image(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            println!("dicomcompare {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Compare DICOM study exports for metadata and pixel differences.");
            println!();
            println!("Run 'dicomcompare --help' for usage information.");
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `debug` with `--verbose` and `warn` without.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<CompareConfig, DicomCompareError> {
    match path {
        Some(path) => CompareConfig::from_yaml_file(path),
        None => Ok(CompareConfig::default()),
    }
}

/// Rejects an unsupported report extension before any export is loaded.
fn check_report_path(path: Option<&Path>) -> Result<(), DicomCompareError> {
    if let Some(path) = path {
        report::ReportFormat::from_path(path)?;
    }
    Ok(())
}

/// Loads every export, keeping extraction directories alive alongside.
fn load_exports(files: &[PathBuf]) -> Result<(Vec<Export>, Vec<WorkDir>), DicomCompareError> {
    if files.len() < 2 {
        return Err(DicomCompareError::NotEnoughFiles(files.len()));
    }

    let mut exports = Vec::with_capacity(files.len());
    let mut workdirs = Vec::with_capacity(files.len());
    for file in files {
        let (export, stats, workdir) = load_export(file)?.into_parts();
        if !stats.failures.is_empty() {
            tracing::warn!(
                "{}: {} file(s) could not be read",
                export.label,
                stats.failures.len()
            );
        }
        exports.push(export);
        workdirs.push(workdir);
    }
    Ok((exports, workdirs))
}

fn print_output<T: Serialize + std::fmt::Display>(
    report: &T,
    output: OutputFormat,
) -> Result<(), DicomCompareError> {
    match output {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).map_err(|source| {
                DicomCompareError::ReportJson {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Execute the compare subcommand.
fn run_compare(args: CompareArgs) -> Result<(), DicomCompareError> {
    let mut config = load_config(args.common.config.as_deref())?;
    config.exclude.extend(args.exclude);
    if args.no_default_exclusions {
        config.use_default_exclusions = false;
    }
    config.validate()?;

    check_report_path(args.common.report.as_deref())?;
    let (exports, _workdirs) = load_exports(&args.common.files)?;
    let scoring = ScoringOptions {
        grades: config.grades,
        top_tags: config.top_tags,
    };
    let report = compare::run_tag_comparison(
        &exports,
        &config.tag_options()?,
        &scoring,
        &Cancellation::new(),
    )?;

    if let Some(path) = &args.common.report {
        report::write_rows(path, &report::tag_rows(&report.results))?;
    }
    print_output(&report, args.common.output)
}

/// Execute the image subcommand.
fn run_image(args: ImageArgs) -> Result<(), DicomCompareError> {
    let mut config = load_config(args.common.config.as_deref())?;
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if args.no_normalize {
        config.normalize = false;
    } else if args.normalize {
        config.normalize = true;
    }
    config.validate()?;

    check_report_path(args.common.report.as_deref())?;
    let (exports, _workdirs) = load_exports(&args.common.files)?;
    let scoring = ScoringOptions {
        grades: config.grades,
        top_tags: config.top_tags,
    };
    let report = compare::run_image_comparison(
        &exports,
        &config.image_options(),
        &scoring,
        &Cancellation::new(),
    )?;

    if let Some(path) = &args.common.report {
        report::write_rows(path, &report::image_rows(&report.results))?;
    }
    print_output(&report, args.common.output)
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), DicomCompareError> {
    let opts = inspect::InspectOptions {
        sample_size: args.sample,
    };

    let mut reports = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let loaded = load_export(file)?;
        reports.push(inspect::inspect_export(&loaded, &opts));
    }

    match args.output {
        OutputFormat::Text => {
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{report}");
            }
            Ok(())
        }
        OutputFormat::Json => print_output(&InspectReports(reports), args.output),
    }
}

/// JSON wrapper so several inspect reports print as one array.
#[derive(Serialize)]
#[serde(transparent)]
struct InspectReports(Vec<inspect::InspectReport>);

impl std::fmt::Display for InspectReports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for report in &self.0 {
            write!(f, "{report}")?;
        }
        Ok(())
    }
}
