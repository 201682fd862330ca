//! Directory traversal.
//!
//! The walk is completed before anything is moved, so every file is seen exactly
//! once and files relocated during the run are never revisited.

use crate::file_category::Category;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found under a root plus the directories that could not be read.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, walkdir::Error)>,
}

/// Recursive file lister that can skip category output directories.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    skip_category_dirs: bool,
}

impl DirectoryWalker {
    /// A walker that skips every directory named after a category.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_category_dirs: true,
        }
    }

    /// A walker that descends everywhere. Used to rescan extraction output.
    pub fn unfiltered(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_category_dirs: false,
        }
    }

    /// Lists every non-directory entry below the root.
    ///
    /// Symlinks are not followed and are reported as files. The root itself is
    /// never skipped, even if it carries a category name.
    pub fn walk(&self) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let skip = self.skip_category_dirs;

        let entries = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                !(skip
                    && entry.depth() > 0
                    && entry.file_type().is_dir()
                    && Category::is_category_dir(&entry.file_name().to_string_lossy()))
            });

        for entry in entries {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {}
                Ok(entry) => outcome.files.push(entry.into_path()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    tracing::warn!(path = %path.display(), error = %err, "cannot read directory entry");
                    outcome.errors.push((path, err));
                }
            }
        }

        outcome
    }
}
