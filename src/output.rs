//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the progress bar shown while files are moved, and the final tally.

use crate::file_organizer::{MoveOutcome, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for moves
/// - The final summary
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filegroup::output::OutputFormatter;
    /// OutputFormatter::success("Moved: scan_front.png → scans/front/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` moves.
    ///
    /// The bar draws on stderr and stays hidden when that is not a terminal.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filegroup::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(3);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb
    }

    /// Prints the line for one move outcome.
    ///
    /// `label` is how the source directory is shown, e.g. its last component.
    pub fn move_outcome(outcome: &MoveOutcome, label: &str, target_folder: &str, dry_run: bool) {
        let name = display_name(&outcome.source);
        match &outcome.result {
            Ok(destination) => {
                let line = format!(
                    "{} → {}/{}/{}",
                    name,
                    label,
                    target_folder,
                    display_name(destination)
                );
                if dry_run {
                    Self::dry_run_notice(&format!("Would move: {}", line));
                } else {
                    Self::success(&format!("Moved: {}", line));
                }
            }
            Err(e) => Self::error(&format!("Error moving {}: {}", name, e)),
        }
    }

    /// Prints the final tally of a run.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use filegroup::file_organizer::{FileOrganizer, OrganizeRequest};
    /// use filegroup::output::OutputFormatter;
    ///
    /// let request = OrganizeRequest::new("scans", "front", "front");
    /// let report = FileOrganizer::default().organize(&request, |_| {}).unwrap();
    /// OutputFormatter::summary(&report);
    /// ```
    pub fn summary(report: &OrganizeReport) {
        println!();
        let tally = if report.dry_run {
            format!("Total files that would be moved: {}", report.moved_count())
        } else {
            format!("Total files moved: {}", report.moved_count())
        };
        println!("{}", tally.green().bold());

        if !report.is_complete_success() {
            let file_word = if report.failed.len() == 1 { "file" } else { "files" };
            Self::warning(&format!(
                "{} {} could not be moved. Please review errors above.",
                report.failed.len(),
                file_word
            ));
        }

        if report.dry_run {
            Self::dry_run_notice("No files were modified.");
        }
    }
}

/// Returns the last component of `path` for display, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
