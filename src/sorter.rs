//! Sorting pipeline.
//!
//! One run walks the root once, classifies every file, then moves and extracts
//! in parallel on a rayon pool. Collecting the parallel results is the join
//! barrier: empty directories are pruned only after every task has finished.

use crate::config::{CollisionPolicy, CompiledFilters, ConfigError, SorterConfig};
use crate::extractor::{
    ArchiveExtractor, ExtractionOutcome, ExtractionRecord, SkipReason, SkippedArchive,
};
use crate::file_category::{Category, ExtensionTable};
use crate::file_organizer::{
    DestinationLocks, FileMover, MoveRecord, OrganizeError, OrganizeResult, validate_root,
};
use crate::pruner::prune_empty_dirs;
use crate::walker::DirectoryWalker;
use indicatif::ProgressBar;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Work decided for a single walked file.
#[derive(Debug, Clone)]
enum Task {
    Move(PathBuf, Category),
    Extract(PathBuf),
}

impl Task {
    fn path(&self) -> &Path {
        match self {
            Task::Move(path, _) | Task::Extract(path) => path,
        }
    }
}

enum TaskOutcome {
    Moved(MoveRecord),
    Extracted(ExtractionOutcome),
    Failed(OrganizeError),
}

/// Classification of one walk, before anything is touched.
#[derive(Debug, Default)]
struct Triage {
    tasks: Vec<Task>,
    unrecognized: Vec<PathBuf>,
    excluded: Vec<PathBuf>,
    known_extensions: BTreeSet<String>,
    unknown_extensions: BTreeSet<String>,
    failures: Vec<OrganizeError>,
}

/// Everything one run did.
#[derive(Debug, Default)]
pub struct SortReport {
    pub root: PathBuf,
    pub moved: Vec<MoveRecord>,
    pub extracted: Vec<ExtractionRecord>,
    pub skipped_archives: Vec<SkippedArchive>,
    /// Files left in place because their extension is not in the table.
    pub unrecognized: Vec<PathBuf>,
    /// Files left in place by the filter rules.
    pub excluded: Vec<PathBuf>,
    /// Extensions seen during the run that the table recognized.
    pub known_extensions: BTreeSet<String>,
    /// Extensions seen during the run that the table did not recognize.
    pub unknown_extensions: BTreeSet<String>,
    pub failures: Vec<OrganizeError>,
    pub removed_dirs: Vec<PathBuf>,
    /// Final contents of each category directory that exists, sorted by name.
    pub listings: BTreeMap<Category, Vec<String>>,
}

impl SortReport {
    /// Files per category directory: moves plus top-level extractions.
    pub fn category_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for record in &self.moved {
            *counts
                .entry(record.category.dir_name().to_string())
                .or_insert(0) += 1;
        }
        let archives = self.extracted.iter().filter(|r| r.depth == 0).count();
        if archives > 0 {
            counts.insert(Category::Archive.dir_name().to_string(), archives);
        }
        counts
    }

    /// Number of walked files that ended up sorted.
    pub fn total_sorted(&self) -> usize {
        self.category_counts().values().sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// One planned move or extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub source: PathBuf,
    /// Target file for moves, target directory for extractions. Collisions are
    /// not resolved.
    pub destination: PathBuf,
    pub category: Category,
}

/// What a run would do, computed without touching the filesystem.
#[derive(Debug, Default)]
pub struct SortPlan {
    pub root: PathBuf,
    pub moves: Vec<PlannedAction>,
    pub extractions: Vec<PlannedAction>,
    pub skipped_archives: Vec<SkippedArchive>,
    pub unrecognized: Vec<PathBuf>,
    pub excluded: Vec<PathBuf>,
    pub known_extensions: BTreeSet<String>,
    pub unknown_extensions: BTreeSet<String>,
    pub failures: Vec<OrganizeError>,
}

impl SortPlan {
    pub fn category_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for action in self.moves.iter().chain(&self.extractions) {
            *counts
                .entry(action.category.dir_name().to_string())
                .or_insert(0) += 1;
        }
        counts
    }
}

/// Sorts directories according to a configuration.
#[derive(Debug, Clone)]
pub struct Sorter {
    config: SorterConfig,
    table: ExtensionTable,
    filters: CompiledFilters,
    progress: Option<ProgressBar>,
}

impl Sorter {
    /// Builds the extension table and compiles the filters from `config`.
    pub fn new(config: SorterConfig) -> Result<Self, ConfigError> {
        let table = config.extension_table()?;
        let filters = config.compile_filters()?;
        Ok(Self {
            config,
            table,
            filters,
            progress: None,
        })
    }

    /// Advances `bar` once per finished file. Its length is set by [`Sorter::run`].
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    fn policy(&self) -> CollisionPolicy {
        self.config.sort.collision
    }

    /// Sorts `root` in place.
    ///
    /// Only an unusable root is an error; per-file problems are collected into
    /// the report.
    pub fn run(&self, root: &Path) -> OrganizeResult<SortReport> {
        validate_root(root)?;
        tracing::info!(root = %root.display(), policy = %self.policy(), "sorting");

        let triage = self.triage(root);
        tracing::info!(
            tasks = triage.tasks.len(),
            unrecognized = triage.unrecognized.len(),
            excluded = triage.excluded.len(),
            "walk complete"
        );

        let locks = DestinationLocks::new();
        let mover = FileMover::new(root, self.policy()).with_locks(locks.clone());
        let extractor = ArchiveExtractor::new(root, self.policy()).with_locks(locks);
        let max_depth = self.config.sort.max_archive_depth;

        if let Some(bar) = &self.progress {
            bar.set_length(triage.tasks.len() as u64);
        }

        let work = || {
            triage
                .tasks
                .par_iter()
                .map(|task| {
                    let outcome = match task {
                        Task::Move(path, category) => match mover.move_to_category(path, *category)
                        {
                            Ok(record) => TaskOutcome::Moved(record),
                            Err(err) => {
                                tracing::warn!(error = %err, "move failed");
                                TaskOutcome::Failed(err)
                            }
                        },
                        Task::Extract(path) => TaskOutcome::Extracted(extractor.extract_all(
                            path,
                            &self.table,
                            max_depth,
                        )),
                    };
                    if let Some(bar) = &self.progress {
                        bar.inc(1);
                    }
                    outcome
                })
                .collect::<Vec<_>>()
        };

        let outcomes = match ThreadPoolBuilder::new()
            .num_threads(self.config.sort.threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(err) => {
                tracing::warn!(error = %err, "cannot build worker pool, using the global one");
                work()
            }
        };

        let mut report = SortReport {
            root: root.to_path_buf(),
            unrecognized: triage.unrecognized,
            excluded: triage.excluded,
            known_extensions: triage.known_extensions,
            unknown_extensions: triage.unknown_extensions,
            failures: triage.failures,
            ..SortReport::default()
        };

        for outcome in outcomes {
            match outcome {
                TaskOutcome::Moved(record) => report.moved.push(record),
                TaskOutcome::Extracted(extraction) => {
                    report.extracted.extend(extraction.records);
                    report.skipped_archives.extend(extraction.skipped);
                    report.failures.extend(extraction.failures);
                }
                TaskOutcome::Failed(err) => report.failures.push(err),
            }
        }

        let pruned = prune_empty_dirs(root);
        report.removed_dirs = pruned.removed;
        report.failures.extend(pruned.failures);
        report.listings = category_listings(root);

        tracing::info!(
            moved = report.moved.len(),
            extracted = report.extracted.len(),
            failures = report.failures.len(),
            removed_dirs = report.removed_dirs.len(),
            "sorting complete"
        );

        Ok(report)
    }

    /// Computes what [`Sorter::run`] would do without changing anything.
    pub fn plan(&self, root: &Path) -> OrganizeResult<SortPlan> {
        validate_root(root)?;

        let triage = self.triage(root);
        let mover = FileMover::new(root, self.policy());
        let extractor = ArchiveExtractor::new(root, self.policy());

        let mut plan = SortPlan {
            root: root.to_path_buf(),
            unrecognized: triage.unrecognized,
            excluded: triage.excluded,
            known_extensions: triage.known_extensions,
            unknown_extensions: triage.unknown_extensions,
            failures: triage.failures,
            ..SortPlan::default()
        };

        for task in triage.tasks {
            match task {
                Task::Move(source, category) => {
                    let destination = mover.planned_destination(&source, category);
                    plan.moves.push(PlannedAction {
                        source,
                        destination,
                        category,
                    });
                }
                Task::Extract(source) => match extractor.planned_destination(&source) {
                    Some((format, destination)) if format.is_supported() => {
                        plan.extractions.push(PlannedAction {
                            source,
                            destination,
                            category: Category::Archive,
                        })
                    }
                    other => {
                        let label = other.map(|(f, _)| f.to_string()).unwrap_or_default();
                        plan.skipped_archives.push(SkippedArchive {
                            path: source,
                            reason: SkipReason::Unsupported(label),
                        });
                    }
                },
            }
        }

        Ok(plan)
    }

    fn triage(&self, root: &Path) -> Triage {
        let walk = DirectoryWalker::new(root).walk();
        let mut triage = Triage {
            failures: walk
                .errors
                .into_iter()
                .map(|(path, source)| OrganizeError::WalkFailed { path, source })
                .collect(),
            ..Triage::default()
        };

        for file in walk.files {
            let relative = file.strip_prefix(root).unwrap_or(&file);
            if self.filters.is_excluded(relative) {
                tracing::debug!(path = %file.display(), "excluded by filters");
                triage.excluded.push(file);
                continue;
            }

            let ext = file
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();

            match self.table.classify(&ext) {
                Some(category) => {
                    triage.known_extensions.insert(ext);
                    triage.tasks.push(match category {
                        Category::Archive => Task::Extract(file),
                        _ => Task::Move(file, category),
                    });
                }
                None => {
                    if !ext.is_empty() {
                        triage.unknown_extensions.insert(ext);
                    }
                    triage.unrecognized.push(file);
                }
            }
        }

        triage.tasks.sort_by(|a, b| a.path().cmp(b.path()));
        triage
    }
}

/// Sorted entry names of each category directory that exists under `root`.
fn category_listings(root: &Path) -> BTreeMap<Category, Vec<String>> {
    Category::ALL
        .into_iter()
        .filter_map(|category| {
            let entries = fs::read_dir(root.join(category.dir_name())).ok()?;
            let mut names: Vec<String> = entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            Some((category, names))
        })
        .collect()
}
