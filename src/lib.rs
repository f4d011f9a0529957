//! Annolint: a high-precision linter for object detection annotation files.
//!
//! Annolint validates COCO-style annotation datasets against a strict
//! schema, then runs a fixed battery of independent analysis rules over the
//! validated data to surface quality anomalies: naming inconsistencies,
//! dangling references, out-of-bounds geometry, statistical outliers.
//!
//! # Modules
//!
//! - [`schema`]: Typed dataset model and three-stage validation
//! - [`rules`]: The analysis rules and their registry
//! - [`scan`]: The rule engine, result aggregation, and reporting
//! - [`error`]: Error types for annolint operations

pub mod error;
pub mod rules;
pub mod scan;
pub mod schema;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

pub use error::AnnolintError;

/// The annolint CLI application.
#[derive(Parser)]
#[command(name = "annolint")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan a single annotation file for anomalies.
    Scan(ScanArgs),

    /// List all available linting rules.
    Rules,
}

/// Arguments for the scan subcommand.
#[derive(clap::Args)]
struct ScanArgs {
    /// Path to the annotation file (e.g., coco.json).
    input: PathBuf,

    /// Path to save the full, untruncated report.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Format for the output report file ('json').
    #[arg(long, short = 'f', default_value = "json")]
    format: String,
}

/// Run the annolint CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), AnnolintError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Scan(args)) => run_scan_command(args),
        Some(Commands::Rules) => {
            run_rules_command();
            Ok(())
        }
        None => {
            // No subcommand: print a usage hint and exit successfully
            println!("annolint {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("A high-precision linter for object detection annotation files.");
            println!();
            println!("Run 'annolint --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the scan subcommand.
fn run_scan_command(args: ScanArgs) -> Result<(), AnnolintError> {
    // Reject an unknown report format before doing any work.
    if args.out.is_some() && args.format != "json" {
        return Err(AnnolintError::UnsupportedFormat(args.format));
    }

    let result = scan::run_scan(&args.input)?;
    let report = result.to_report();

    // Terminal view, truncated per rule for readability.
    print!("{report}");

    // File report, full and untruncated.
    if let Some(out) = args.out {
        let content = report
            .to_json_string()
            .map_err(|source| AnnolintError::ReportSerialize { source })?;
        fs::write(&out, content).map_err(|source| AnnolintError::ReportWrite {
            path: out.clone(),
            source,
        })?;
        info!(path = %out.display(), "report written");
        println!();
        println!("Full report saved to: {}", out.display());
    }

    if result.total_findings > 0 {
        Err(AnnolintError::IssuesFound {
            total: result.total_findings,
        })
    } else {
        Ok(())
    }
}

/// Execute the rules subcommand.
fn run_rules_command() {
    println!("Available linting rules:");
    println!();
    for rule in rules::all_rules() {
        println!("  {:<42} {}", rule.name, rule.summary);
    }
}
