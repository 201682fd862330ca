//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. Reports produced by the sorter are
//! rendered here and nowhere else.

use crate::extractor::SkippedArchive;
use crate::file_category::Category;
use crate::file_organizer::OrganizeError;
use crate::sorter::{SortPlan, SortReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for sorting runs
/// - Summary tables and full run reports
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Directory sorted");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::error("Failed to extract data.zip");
    /// ```
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

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for a sorting run.
    ///
    /// The length can be changed later with [`ProgressBar::set_length`] once the
    /// number of files is known.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("█▓░"));
        }
        pb
    }

    /// Prints a summary table with file counts by category.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("documents".to_string(), 15);
    /// counts.insert("images".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let max_category_len = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8); // "Category"

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in &categories {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count, "file", "files"),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files, "file", "files"),
            width = max_category_len
        );
    }

    /// Prints the extensions seen during a run, split into known and unknown.
    pub fn extension_sets(known: &BTreeSet<String>, unknown: &BTreeSet<String>) {
        Self::plain(&format!("Known extensions: {}", join_or_none(known)));
        Self::plain(&format!("Unknown extensions: {}", join_or_none(unknown)));
    }

    /// Prints the final contents of each category directory.
    pub fn category_listings(listings: &BTreeMap<Category, Vec<String>>) {
        if listings.is_empty() {
            return;
        }
        Self::header("CATEGORIES");
        for (category, names) in listings {
            println!("{}/ ({})", category.dir_name().cyan(), names.len());
            for name in names {
                println!("  {}", name);
            }
        }
    }

    pub fn removed_dirs(root: &Path, removed: &[PathBuf]) {
        for dir in removed {
            Self::plain(&format!(
                "Removed empty directory: {}",
                relative(root, dir).display()
            ));
        }
    }

    pub fn skipped_archives(root: &Path, skipped: &[SkippedArchive]) {
        for archive in skipped {
            Self::warning(&format!(
                "Skipped {}: {}",
                relative(root, &archive.path).display(),
                archive.reason
            ));
        }
    }

    /// Prints every per-file failure to stderr.
    pub fn failures(failures: &[OrganizeError]) {
        if failures.is_empty() {
            return;
        }
        Self::header("ERRORS");
        for failure in failures {
            Self::error(&failure.to_string());
        }
    }

    /// Prints the full report of a completed run.
    pub fn sort_report(report: &SortReport) {
        let root = report.root.as_path();

        for record in &report.moved {
            Self::success(&format!(
                "{} → {}",
                relative(root, &record.original_path).display(),
                relative(root, &record.new_path).display()
            ));
        }
        for record in &report.extracted {
            let nested = if record.depth > 0 { " (nested)" } else { "" };
            Self::success(&format!(
                "Extracted {} [{}] → {}/ ({} {}){}",
                relative(root, &record.archive).display(),
                record.format,
                relative(root, &record.destination).display(),
                record.entries,
                plural(record.entries, "entry", "entries"),
                nested
            ));
            if !record.archive_removed {
                Self::warning(&format!(
                    "{} was extracted but could not be deleted",
                    relative(root, &record.archive).display()
                ));
            }
        }
        Self::skipped_archives(root, &report.skipped_archives);
        Self::removed_dirs(root, &report.removed_dirs);

        println!();
        Self::extension_sets(&report.known_extensions, &report.unknown_extensions);
        if !report.unrecognized.is_empty() {
            Self::info(&format!(
                "{} unrecognized {} left in place",
                report.unrecognized.len(),
                plural(report.unrecognized.len(), "file", "files")
            ));
        }
        if !report.excluded.is_empty() {
            Self::info(&format!(
                "{} excluded {} left in place",
                report.excluded.len(),
                plural(report.excluded.len(), "file", "files")
            ));
        }

        Self::category_listings(&report.listings);
        Self::summary_table(&report.category_counts(), report.total_sorted());
        Self::failures(&report.failures);
    }

    /// Prints what a run would do.
    pub fn sort_plan(plan: &SortPlan) {
        let root = plan.root.as_path();

        if plan.moves.is_empty() && plan.extractions.is_empty() {
            Self::dry_run_notice("Nothing to sort.");
        }
        for action in &plan.moves {
            Self::dry_run_notice(&format!(
                "Would move {} → {}",
                relative(root, &action.source).display(),
                relative(root, &action.destination).display()
            ));
        }
        for action in &plan.extractions {
            Self::dry_run_notice(&format!(
                "Would extract {} → {}/",
                relative(root, &action.source).display(),
                relative(root, &action.destination).display()
            ));
        }
        Self::skipped_archives(root, &plan.skipped_archives);

        println!();
        Self::extension_sets(&plan.known_extensions, &plan.unknown_extensions);

        let counts = plan.category_counts();
        let total = counts.values().sum();
        Self::summary_table(&counts, total);
        Self::failures(&plan.failures);
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

fn join_or_none(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "(none)".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "file", "files"), "file");
        assert_eq!(plural(0, "file", "files"), "files");
        assert_eq!(plural(3, "entry", "entries"), "entries");
    }

    #[test]
    fn test_relative_strips_root() {
        let root = Path::new("/data/inbox");
        assert_eq!(
            relative(root, Path::new("/data/inbox/images/a.png")),
            Path::new("images/a.png")
        );
        assert_eq!(relative(root, Path::new("/elsewhere/b")), Path::new("/elsewhere/b"));
    }

    #[test]
    fn test_join_or_none() {
        let mut set = BTreeSet::new();
        assert_eq!(join_or_none(&set), "(none)");
        set.insert("zip".to_string());
        set.insert("jpg".to_string());
        assert_eq!(join_or_none(&set), "jpg, zip");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = OutputFormatter::create_progress_bar(10);
        assert_eq!(pb.length(), Some(10));
        pb.set_length(3);
        assert_eq!(pb.length(), Some(3));
    }
}
