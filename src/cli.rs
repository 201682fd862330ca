//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading and flag overrides
//! - Sorting orchestration and dry runs
//! - Report printing

use crate::config::{CollisionPolicy, SorterConfig};
use crate::output::OutputFormatter;
use crate::sorter::Sorter;
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// Sorts a directory in place: files go into category folders, archives are
/// unpacked, empty folders are removed.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version)]
pub struct Cli {
    /// Directory to sort
    pub target: PathBuf,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do when a destination name is taken: rename, overwrite or fail
    #[arg(long, value_name = "POLICY")]
    pub collision: Option<CollisionPolicy>,

    /// Worker threads (0 = one per CPU core)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// How many levels of nested archives to unpack
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log filter directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Loads the configuration file, if any, and applies flag overrides.
    pub fn resolve_config(&self) -> Result<SorterConfig, String> {
        let mut config = SorterConfig::load(self.config.as_deref())
            .map_err(|e| format!("Error loading configuration: {}", e))?;

        if let Some(policy) = self.collision {
            config.sort.collision = policy;
        }
        if let Some(threads) = self.threads {
            config.sort.threads = threads;
        }
        if let Some(depth) = self.max_depth {
            config.sort.max_archive_depth = depth;
        }
        Ok(config)
    }
}

/// Runs the CLI application for parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["dirsort", "/path/to/directory", "--dry-run"]);
/// if let Err(e) = run_cli(&cli) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<(), String> {
    let config = cli.resolve_config()?;
    if cli.dry_run {
        sort_directory_dry_run(&cli.target, config)
    } else {
        sort_directory(&cli.target, config, cli.quiet)
    }
}

/// Sorts `base_path` and prints the report.
///
/// Per-file failures are printed but do not make this fail; only an unusable
/// root or configuration does.
pub fn sort_directory(base_path: &Path, config: SorterConfig, quiet: bool) -> Result<(), String> {
    let mut sorter =
        Sorter::new(config).map_err(|e| format!("Error compiling configuration: {}", e))?;

    let progress = (!quiet).then(|| OutputFormatter::create_progress_bar(0));
    if let Some(bar) = &progress {
        OutputFormatter::info(&format!("Sorting contents of: {}", base_path.display()));
        sorter = sorter.with_progress(bar.clone());
    }

    let result = sorter.run(base_path);
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    let report = result.map_err(|e| e.to_string())?;

    if quiet {
        OutputFormatter::failures(&report.failures);
        return Ok(());
    }

    OutputFormatter::sort_report(&report);
    if report.has_failures() {
        OutputFormatter::warning(&format!(
            "Finished with {} {}. Affected files were left in place.",
            report.failures.len(),
            if report.failures.len() == 1 { "error" } else { "errors" }
        ));
    } else {
        OutputFormatter::success("Sorting complete!");
    }
    Ok(())
}

/// Prints what sorting `base_path` would do without changing anything.
pub fn sort_directory_dry_run(base_path: &Path, config: SorterConfig) -> Result<(), String> {
    let sorter =
        Sorter::new(config).map_err(|e| format!("Error compiling configuration: {}", e))?;

    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", base_path.display()));
    let plan = sorter.plan(base_path).map_err(|e| e.to_string())?;
    OutputFormatter::sort_plan(&plan);

    println!("\n✓ Dry run complete. No files were modified.");
    println!(
        "Run 'dirsort {}' (without --dry-run) to sort the directory.",
        base_path.display()
    );
    Ok(())
}
