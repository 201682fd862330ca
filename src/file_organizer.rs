/// Moving files into their category directories.
///
/// A [`FileMover`] relocates one file at a time into `<root>/<category>/`
/// under its normalized name. Directory creation, the collision check and the
/// rename all happen while holding the lock of the destination directory, so
/// concurrent movers never race on `mkdir` or on the same target name.
use crate::config::CollisionPolicy;
use crate::extractor::ExtractError;
use crate::file_category::Category;
use crate::transliterate::normalize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Errors that can occur while sorting a directory.
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    /// The sort root is missing or not a directory.
    #[error("Invalid root directory {}: {source}", .path.display())]
    InvalidRoot { path: PathBuf, source: io::Error },
    /// Failed to create a category or extraction directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its category directory.
    #[error("Failed to move {} to {}: {source}", .source_path.display(), .destination.display())]
    MoveFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// The destination is taken and the collision policy is `fail`.
    #[error("{} already exists, {} left in place", .destination.display(), .source_path.display())]
    NameCollision {
        source_path: PathBuf,
        destination: PathBuf,
    },
    /// An archive could not be unpacked. The archive itself is kept.
    #[error("Failed to extract {}: {source}", .archive.display())]
    ExtractionFailed { archive: PathBuf, source: ExtractError },
    /// A directory could not be read during traversal.
    #[error("Cannot read {}: {source}", .path.display())]
    WalkFailed {
        path: PathBuf,
        source: walkdir::Error,
    },
    /// An empty directory could not be removed.
    #[error("Failed to remove directory {}: {source}", .path.display())]
    PruneFailed { path: PathBuf, source: io::Error },
}

/// Result type for sorting operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Checks that `root` exists and is a directory.
pub fn validate_root(root: &Path) -> OrganizeResult<()> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::InvalidRoot {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        }),
        Err(source) => Err(OrganizeError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        }),
    }
}

/// A completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub category: Category,
}

/// One mutex per destination directory.
///
/// Cloning shares the underlying map, so every worker of a run serializes on the
/// same locks.
#[derive(Debug, Clone, Default)]
pub struct DestinationLocks {
    inner: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl DestinationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding `dir`, creating it on first use.
    pub fn lock_for(&self, dir: &Path) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.entry(dir.to_path_buf()).or_default().clone()
    }

    /// Runs `f` while holding the lock of `dir`.
    pub fn with_lock<T>(&self, dir: &Path, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(dir);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

/// True if anything (including a dangling symlink) sits at `path`.
pub(crate) fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// `stem_n.ext`, or `stem_n` without an extension.
pub(crate) fn numbered_name(stem: &str, ext: Option<&str>, n: usize) -> String {
    match ext {
        Some(ext) => format!("{}_{}.{}", stem, n, ext),
        None => format!("{}_{}", stem, n),
    }
}

/// Relocates files into category directories under a root.
#[derive(Debug, Clone)]
pub struct FileMover {
    root: PathBuf,
    policy: CollisionPolicy,
    locks: DestinationLocks,
}

impl FileMover {
    pub fn new(root: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
            locks: DestinationLocks::new(),
        }
    }

    /// Shares an existing lock map instead of a private one.
    pub fn with_locks(mut self, locks: DestinationLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Normalized stem and lowercased extension of `file`.
    ///
    /// A stem that normalizes to nothing (e.g. a lone soft sign) becomes `_`.
    pub fn normalized_parts(file: &Path) -> (String, Option<String>) {
        let stem = file
            .file_stem()
            .map(|s| normalize(&s.to_string_lossy()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "_".to_string());
        let ext = file
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        (stem, ext)
    }

    /// The file name `file` gets inside its category directory.
    ///
    /// ```
    /// use dirsort::file_organizer::FileMover;
    /// use std::path::Path;
    ///
    /// assert_eq!(FileMover::destination_name(Path::new("in/Звіт.DOCX")), "Zvit.docx");
    /// assert_eq!(FileMover::destination_name(Path::new("my photo.JPG")), "my_photo.jpg");
    /// ```
    pub fn destination_name(file: &Path) -> String {
        match Self::normalized_parts(file) {
            (stem, Some(ext)) => format!("{}.{}", stem, ext),
            (stem, None) => stem,
        }
    }

    /// Where `file` would land today, ignoring collisions. Used for dry runs.
    pub fn planned_destination(&self, file: &Path, category: Category) -> PathBuf {
        self.root
            .join(category.dir_name())
            .join(Self::destination_name(file))
    }

    /// Moves `file` into `<root>/<category>/` under its normalized name.
    ///
    /// On any error the file stays where it was.
    pub fn move_to_category(&self, file: &Path, category: Category) -> OrganizeResult<MoveRecord> {
        validate_root(&self.root)?;

        let category_dir = self.root.join(category.dir_name());

        self.locks.with_lock(&category_dir, || {
            fs::create_dir_all(&category_dir).map_err(|source| {
                OrganizeError::DirectoryCreationFailed {
                    path: category_dir.clone(),
                    source,
                }
            })?;

            let destination = self.resolve_destination(file, &category_dir)?;

            relocate(file, &destination).map_err(|source| OrganizeError::MoveFailed {
                source_path: file.to_path_buf(),
                destination: destination.clone(),
                source,
            })?;

            tracing::debug!(
                from = %file.display(),
                to = %destination.display(),
                %category,
                "moved"
            );

            Ok(MoveRecord {
                original_path: file.to_path_buf(),
                new_path: destination,
                category,
            })
        })
    }

    /// Applies the collision policy. Must be called with the directory lock held.
    fn resolve_destination(&self, file: &Path, dir: &Path) -> OrganizeResult<PathBuf> {
        let (stem, ext) = Self::normalized_parts(file);
        let candidate = dir.join(Self::destination_name(file));

        if !occupied(&candidate) {
            return Ok(candidate);
        }

        match self.policy {
            CollisionPolicy::Overwrite => Ok(candidate),
            CollisionPolicy::Fail => Err(OrganizeError::NameCollision {
                source_path: file.to_path_buf(),
                destination: candidate,
            }),
            CollisionPolicy::Rename => Ok((1..)
                .map(|n| dir.join(numbered_name(&stem, ext.as_deref(), n)))
                .find(|p| !occupied(p))
                .unwrap_or(candidate)),
        }
    }
}

/// Renames `source` to `destination`, copying across filesystems if needed.
fn relocate(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(source, destination)
        }
        other => other,
    }
}

/// Copies into a hidden staging file next to `destination`, renames it into
/// place and removes `source`. Any failure leaves `source` untouched.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    copy_then_remove_with(source, destination, |path| fs::remove_file(path))
}

fn copy_then_remove_with(
    source: &Path,
    destination: &Path,
    remove_source: impl FnOnce(&Path) -> io::Result<()>,
) -> io::Result<()> {
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = destination.with_file_name(format!(".{}.dirsort-partial", file_name));
    // an overwritten destination is gone once the staging file replaces it
    let replaces_existing = occupied(destination);

    if let Err(err) = fs::copy(source, &staging).and_then(|_| fs::rename(&staging, destination)) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }

    if let Err(err) = remove_source(source) {
        if !replaces_existing {
            let _ = fs::remove_file(destination);
        }
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_move_creates_directory_and_normalizes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let file_path = root.join("Звіт.DOCX");
        fs::write(&file_path, "report").expect("Failed to write test file");

        let mover = FileMover::new(root, CollisionPolicy::Rename);
        let record = mover
            .move_to_category(&file_path, Category::Document)
            .expect("Failed to move file");

        assert!(root.join("documents").is_dir());
        assert!(!file_path.exists());
        assert_eq!(record.new_path, root.join("documents").join("Zvit.docx"));
        assert_eq!(record.category, Category::Document);
        assert_eq!(fs::read_to_string(&record.new_path).unwrap(), "report");
    }

    #[test]
    fn test_move_from_subdirectory_uses_existing_category_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("images")).unwrap();
        fs::create_dir_all(root.join("trip/day1")).unwrap();

        let file_path = root.join("trip/day1/IMG 001.PNG");
        fs::write(&file_path, "png").unwrap();

        let mover = FileMover::new(root, CollisionPolicy::Rename);
        mover
            .move_to_category(&file_path, Category::Image)
            .expect("Failed to move file");

        assert!(root.join("images/IMG_001.png").exists());
        assert!(!file_path.exists());
    }

    #[test]
    fn test_collision_rename_appends_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("documents")).unwrap();
        fs::write(root.join("documents/notes.txt"), "old").unwrap();
        fs::write(root.join("documents/notes_1.txt"), "older").unwrap();
        fs::write(root.join("notes.TXT"), "new").unwrap();

        let mover = FileMover::new(root, CollisionPolicy::Rename);
        let record = mover
            .move_to_category(&root.join("notes.TXT"), Category::Document)
            .unwrap();

        assert_eq!(record.new_path, root.join("documents/notes_2.txt"));
        assert_eq!(fs::read_to_string(root.join("documents/notes.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(&record.new_path).unwrap(), "new");
    }

    #[test]
    fn test_collision_fail_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("audio")).unwrap();
        fs::write(root.join("audio/song.mp3"), "old").unwrap();
        fs::write(root.join("song.mp3"), "new").unwrap();

        let mover = FileMover::new(root, CollisionPolicy::Fail);
        let result = mover.move_to_category(&root.join("song.mp3"), Category::Audio);

        assert!(matches!(result, Err(OrganizeError::NameCollision { .. })));
        assert_eq!(fs::read_to_string(root.join("song.mp3")).unwrap(), "new");
        assert_eq!(fs::read_to_string(root.join("audio/song.mp3")).unwrap(), "old");
    }

    #[test]
    fn test_collision_overwrite_replaces() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("videos")).unwrap();
        fs::write(root.join("videos/clip.mp4"), "old").unwrap();
        fs::write(root.join("clip.MP4"), "new").unwrap();

        let mover = FileMover::new(root, CollisionPolicy::Overwrite);
        mover
            .move_to_category(&root.join("clip.MP4"), Category::Video)
            .unwrap();

        assert!(!root.join("clip.MP4").exists());
        assert_eq!(fs::read_to_string(root.join("videos/clip.mp4")).unwrap(), "new");
    }

    #[test]
    fn test_move_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mover = FileMover::new(root, CollisionPolicy::Rename);
        let result = mover.move_to_category(&root.join("ghost.txt"), Category::Document);

        assert!(matches!(result, Err(OrganizeError::MoveFailed { .. })));
    }

    #[test]
    fn test_move_invalid_root() {
        let mover = FileMover::new("/non/existent/path", CollisionPolicy::Rename);
        let result = mover.move_to_category(Path::new("/some/file.txt"), Category::Document);
        assert!(matches!(result, Err(OrganizeError::InvalidRoot { .. })));
    }

    #[test]
    fn test_concurrent_moves_to_same_name_never_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let sources: Vec<PathBuf> = (0..16)
            .map(|i| {
                let dir = root.join(format!("d{}", i));
                fs::create_dir(&dir).unwrap();
                let file = dir.join("report.txt");
                fs::write(&file, i.to_string()).unwrap();
                file
            })
            .collect();

        let mover = FileMover::new(root, CollisionPolicy::Rename);
        std::thread::scope(|scope| {
            for source in &sources {
                let mover = &mover;
                scope.spawn(move || mover.move_to_category(source, Category::Document).unwrap());
            }
        });

        let mut contents: Vec<u32> = fs::read_dir(root.join("documents"))
            .unwrap()
            .map(|e| fs::read_to_string(e.unwrap().path()).unwrap().parse().unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, (0..16).collect::<Vec<u32>>());
    }

    #[test]
    fn test_destination_name_edge_cases() {
        assert_eq!(FileMover::destination_name(Path::new("ь.txt")), "_.txt");
        assert_eq!(FileMover::destination_name(Path::new("archive.tar.gz")), "archive_tar.gz");
        assert_eq!(FileMover::destination_name(Path::new("Makefile")), "Makefile");
    }

    #[test]
    fn test_locks_are_shared_per_directory() {
        let locks = DestinationLocks::new();
        let a = locks.lock_for(Path::new("/x/images"));
        let b = locks.clone().lock_for(Path::new("/x/images"));
        let c = locks.lock_for(Path::new("/x/audio"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_copy_then_remove_moves_and_leaves_no_staging_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("from/s.txt");
        let destination = temp_dir.path().join("to/d.txt");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(destination.parent().unwrap()).unwrap();
        fs::write(&source, "v").unwrap();

        copy_then_remove(&source, &destination).expect("Fallback move failed");

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "v");
        let leftovers: Vec<_> = fs::read_dir(destination.parent().unwrap())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(leftovers, vec!["d.txt"]);
    }

    #[test]
    fn test_copy_fallback_keeps_new_copy_when_overwrite_cannot_remove_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("s.txt");
        let destination = temp_dir.path().join("d.txt");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "old").unwrap();

        let result = copy_then_remove_with(&source, &destination, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&source).unwrap(), "new");
        assert_eq!(fs::read_to_string(&destination).unwrap(), "new");
    }

    #[test]
    fn test_copy_fallback_cleans_up_fresh_copy_when_source_cannot_be_removed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("s.txt");
        let destination = temp_dir.path().join("d.txt");
        fs::write(&source, "v").unwrap();

        let result = copy_then_remove_with(&source, &destination, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        });

        assert!(result.is_err());
        assert!(source.exists());
        assert!(!destination.exists());
    }
}
