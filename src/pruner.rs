//! Empty-directory cleanup after sorting.

use crate::file_organizer::OrganizeError;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories removed by a prune pass and the ones that could not be.
#[derive(Debug, Default)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<OrganizeError>,
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

/// Removes every empty directory below `root`, deepest first, so parents
/// emptied by the pass are removed in the same pass. The root is kept.
pub fn prune_empty_dirs(root: &Path) -> PruneReport {
    let mut report = PruneReport::default();

    let entries = WalkDir::new(root)
        .follow_links(false)
        .contents_first(true)
        .min_depth(1);

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                tracing::warn!(path = %path.display(), error = %err, "cannot read directory during prune");
                report
                    .failures
                    .push(OrganizeError::WalkFailed { path, source: err });
                continue;
            }
        };

        if !entry.file_type().is_dir() || !is_empty_dir(entry.path()) {
            continue;
        }

        match fs::remove_dir(entry.path()) {
            Ok(()) => {
                tracing::debug!(path = %entry.path().display(), "removed empty directory");
                report.removed.push(entry.into_path());
            }
            Err(source) => {
                tracing::warn!(path = %entry.path().display(), error = %source, "cannot remove empty directory");
                report.failures.push(OrganizeError::PruneFailed {
                    path: entry.into_path(),
                    source,
                });
            }
        }
    }

    report
}
