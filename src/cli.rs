//! Command-line interface module for filegroup.
//!
//! This module handles all CLI-related functionality including:
//! - Argument definition
//! - Loading the optional filter configuration
//! - Running an organize pass with progress and per-file reporting

use crate::config::FilterConfig;
use crate::file_organizer::{FileOrganizer, OrganizeReport, OrganizeRequest};
use crate::output::{OutputFormatter, display_name};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use std::path::PathBuf;
use tracing::debug;

/// Example invocation, shown in `--help` and after a usage error.
pub const EXAMPLE: &str = "Example: filegroup ./scans front front";

/// Move files whose names contain a text into a subfolder.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, after_help = EXAMPLE)]
pub struct Args {
    /// Directory to scan (subdirectories are not entered)
    #[arg(value_hint = ValueHint::DirPath)]
    pub directory: PathBuf,

    /// Text to look for in file names, ignoring case
    #[arg(allow_hyphen_values = true)]
    pub search_text: String,

    /// Name of the subfolder that receives matching files
    #[arg(allow_hyphen_values = true)]
    pub target_folder: String,

    /// Only print what would be moved
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// TOML file with exclusion filters
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the organize request from the positional arguments.
    pub fn request(&self) -> OrganizeRequest {
        OrganizeRequest::new(
            self.directory.clone(),
            self.search_text.clone(),
            self.target_folder.clone(),
        )
    }
}

/// Runs the CLI application with parsed arguments.
///
/// Loads the filter configuration named by `--config`, if any, then organizes
/// the directory.
///
/// # Errors
///
/// Returns an error for configuration problems and for precondition failures
/// (missing directory, invalid target name, ...). Files that fail to move do
/// not make this fail; they are listed in the returned report.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use filegroup::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["filegroup", "/path/to/scans", "front", "front"]);
/// match run_cli(&args) {
///     Ok(report) => println!("{} files moved", report.moved_count()),
///     Err(e) => eprintln!("Error: {:#}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<OrganizeReport> {
    let config =
        FilterConfig::load(args.config.as_deref()).context("Error loading configuration")?;
    let filters = config.compile().context("Error compiling filters")?;
    debug!(config = ?args.config, dry_run = args.dry_run, "Configuration loaded");

    let organizer = FileOrganizer::new(filters, args.dry_run);
    organize_directory(&organizer, &args.request())
}

/// Organizes one directory and reports progress on the terminal.
///
/// This function:
/// 1. Prints the run parameters
/// 2. Validates the inputs, creates the target folder and scans
///    ([`FileOrganizer::prepare`])
/// 3. Moves each match, printing its outcome
/// 4. Prints the final tally
pub fn organize_directory(
    organizer: &FileOrganizer,
    request: &OrganizeRequest,
) -> Result<OrganizeReport> {
    OutputFormatter::info(&format!("Target directory: {}", request.directory.display()));
    OutputFormatter::info(&format!("Search text: '{}'", request.search_text));
    OutputFormatter::info(&format!("Target folder: '{}'", request.target_folder));
    OutputFormatter::plain(&"-".repeat(50));

    let run = organizer.prepare(request)?;

    let label = display_name(&request.directory);
    if organizer.is_dry_run() {
        OutputFormatter::dry_run_notice(&format!("Processing directory: {}", label));
    } else {
        OutputFormatter::plain(&format!("Processing directory: {}", label));
    }

    if run.candidates.is_empty() {
        OutputFormatter::warning("No matching files found.");
    }

    let pb = OutputFormatter::create_progress_bar(run.candidates.len() as u64);
    let report = organizer.move_candidates(&run.target_dir, &run.candidates, |outcome| {
        pb.suspend(|| {
            OutputFormatter::move_outcome(
                outcome,
                &label,
                &request.target_folder,
                organizer.is_dry_run(),
            )
        });
        pb.inc(1);
    });
    pb.finish_and_clear();

    OutputFormatter::summary(&report);
    Ok(report)
}
