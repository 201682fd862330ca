//! Archive extraction.
//!
//! Every archive is unpacked into a fresh `<root>/archives/<stem>/` directory
//! and deleted only after its decoder reported success. Archives found inside
//! the unpacked output go through the same entry point, up to a depth limit.

use crate::config::CollisionPolicy;
use crate::file_category::{Category, ExtensionTable};
use crate::file_organizer::{
    DestinationLocks, OrganizeError, OrganizeResult, numbered_name, occupied,
};
use crate::walker::DirectoryWalker;
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

/// Errors raised by the archive decoders.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Rar error: {0}")]
    Rar(String),
    #[error("Unsupported archive format: {0}")]
    Unsupported(String),
}

/// Archive formats recognized by sniffing or by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    /// A single gzip-compressed file.
    Gzip,
    Rar,
    /// Recognized but not unpacked.
    SevenZip,
}

impl ArchiveFormat {
    pub fn is_supported(&self) -> bool {
        !matches!(self, ArchiveFormat::SevenZip)
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "zip" => Some(ArchiveFormat::Zip),
            "tar" => Some(ArchiveFormat::Tar),
            "tgz" => Some(ArchiveFormat::TarGz),
            "gz" => Some(ArchiveFormat::Gzip),
            "rar" => Some(ArchiveFormat::Rar),
            "7z" => Some(ArchiveFormat::SevenZip),
            _ => None,
        }
    }

    /// Detects the format of `path` from its magic bytes, falling back to the
    /// extension when the content is not recognized.
    pub fn detect(path: &Path) -> Option<Self> {
        let sniffed = infer::get_from_path(path)
            .ok()
            .flatten()
            .and_then(|kind| Self::from_extension(kind.extension()));
        let by_extension = path
            .extension()
            .and_then(|e| Self::from_extension(&e.to_string_lossy()));

        match sniffed.or(by_extension)? {
            ArchiveFormat::Gzip | ArchiveFormat::TarGz => {
                if has_tar_name(path) || gzip_wraps_tar(path) {
                    Some(ArchiveFormat::TarGz)
                } else {
                    Some(ArchiveFormat::Gzip)
                }
            }
            format => Some(format),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Gzip => "gzip",
            ArchiveFormat::Rar => "rar",
            ArchiveFormat::SevenZip => "7z",
        })
    }
}

fn has_tar_name(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

/// Peeks into the decompressed stream for a tar header.
fn gzip_wraps_tar(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(512);
    if GzDecoder::new(BufReader::new(file))
        .take(512)
        .read_to_end(&mut head)
        .is_err()
    {
        return false;
    }
    infer::archive::is_tar(&head)
}

/// Directory name for the unpacked contents of `archive`.
///
/// `photos.zip` → `photos`, `backup.tar.gz` / `backup.tgz` → `backup`.
pub fn archive_stem(archive: &Path, format: ArchiveFormat) -> String {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());

    match format {
        ArchiveFormat::TarGz => match stem.len().checked_sub(4) {
            Some(cut) if stem.is_char_boundary(cut) && stem[cut..].eq_ignore_ascii_case(".tar") => {
                stem[..cut].to_string()
            }
            _ => stem,
        },
        _ => stem,
    }
}

/// A successfully unpacked archive.
#[derive(Debug, Clone)]
pub struct ExtractionRecord {
    pub archive: PathBuf,
    pub destination: PathBuf,
    pub format: ArchiveFormat,
    /// Number of entries written.
    pub entries: usize,
    /// 0 for archives found by the walk, n for archives nested n levels deep.
    pub depth: usize,
    /// False if the archive could not be deleted after unpacking.
    pub archive_removed: bool,
}

/// Why an archive was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unsupported(String),
    DepthLimit(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unsupported(format) => write!(f, "unsupported format ({})", format),
            SkipReason::DepthLimit(depth) => {
                write!(f, "nested {} levels deep, over the depth limit", depth)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedArchive {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Everything that happened while unpacking one archive and its nested ones.
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    pub records: Vec<ExtractionRecord>,
    pub skipped: Vec<SkippedArchive>,
    pub failures: Vec<OrganizeError>,
}

/// Unpacks archives under `<root>/archives/`.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    root: PathBuf,
    policy: CollisionPolicy,
    locks: DestinationLocks,
}

impl ArchiveExtractor {
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

    /// The extraction root, `<root>/archives`.
    pub fn archives_dir(&self) -> PathBuf {
        self.root.join(Category::Archive.dir_name())
    }

    /// Where `archive` would be unpacked, ignoring collisions. Used for dry runs.
    pub fn planned_destination(&self, archive: &Path) -> Option<(ArchiveFormat, PathBuf)> {
        let format = ArchiveFormat::detect(archive)?;
        Some((format, self.archives_dir().join(archive_stem(archive, format))))
    }

    /// Unpacks `archive`, then every archive found in its output, depth first.
    ///
    /// Failures and skips are collected; nothing here aborts sibling work.
    pub fn extract_all(
        &self,
        archive: &Path,
        table: &ExtensionTable,
        max_depth: usize,
    ) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();
        let mut pending = vec![(archive.to_path_buf(), 0usize)];

        while let Some((path, depth)) = pending.pop() {
            let format = match ArchiveFormat::detect(&path) {
                Some(format) if format.is_supported() => format,
                other => {
                    let label = other.map_or_else(
                        || {
                            path.extension()
                                .map(|e| e.to_string_lossy().to_lowercase())
                                .unwrap_or_default()
                        },
                        |f| f.to_string(),
                    );
                    tracing::info!(path = %path.display(), format = %label, "archive left untouched");
                    outcome.skipped.push(SkippedArchive {
                        path,
                        reason: SkipReason::Unsupported(label),
                    });
                    continue;
                }
            };

            if depth > max_depth {
                tracing::warn!(path = %path.display(), depth, "archive nesting limit reached");
                outcome.skipped.push(SkippedArchive {
                    path,
                    reason: SkipReason::DepthLimit(depth),
                });
                continue;
            }

            match self.extract(&path, format, depth) {
                Ok(record) => {
                    let nested = DirectoryWalker::unfiltered(&record.destination).walk();
                    for file in nested.files {
                        let is_archive = file
                            .extension()
                            .is_some_and(|e| table.is_archive(&e.to_string_lossy()));
                        if is_archive {
                            pending.push((file, depth + 1));
                        }
                    }
                    for (path, source) in nested.errors {
                        outcome
                            .failures
                            .push(OrganizeError::WalkFailed { path, source });
                    }
                    outcome.records.push(record);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "extraction failed");
                    outcome.failures.push(err);
                }
            }
        }

        outcome
    }

    /// Unpacks a single archive into a fresh directory and deletes it.
    ///
    /// On failure the archive is kept and a directory created for it is removed.
    pub fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        depth: usize,
    ) -> OrganizeResult<ExtractionRecord> {
        let failed = |source: ExtractError| OrganizeError::ExtractionFailed {
            archive: archive.to_path_buf(),
            source,
        };

        if !format.is_supported() {
            return Err(failed(ExtractError::Unsupported(format.to_string())));
        }

        let (destination, created) = self.reserve_destination(archive, format)?;

        let entries = match unpack(archive, format, &destination) {
            Ok(entries) => entries,
            Err(source) => {
                if created {
                    let _ = fs::remove_dir_all(&destination);
                }
                return Err(failed(source));
            }
        };

        let archive_removed = match fs::remove_file(archive) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %archive.display(), error = %err, "unpacked archive could not be deleted");
                false
            }
        };

        tracing::debug!(
            archive = %archive.display(),
            destination = %destination.display(),
            %format,
            entries,
            depth,
            "extracted"
        );

        Ok(ExtractionRecord {
            archive: archive.to_path_buf(),
            destination,
            format,
            entries,
            depth,
            archive_removed,
        })
    }

    /// Picks and creates the extraction directory under the `archives` lock.
    ///
    /// Returns the directory and whether it was newly created.
    fn reserve_destination(
        &self,
        archive: &Path,
        format: ArchiveFormat,
    ) -> OrganizeResult<(PathBuf, bool)> {
        let archives_dir = self.archives_dir();
        let stem = archive_stem(archive, format);

        self.locks.with_lock(&archives_dir, || {
            let mkdir = |path: &Path| {
                fs::create_dir_all(path).map_err(|source| OrganizeError::DirectoryCreationFailed {
                    path: path.to_path_buf(),
                    source,
                })
            };

            let candidate = archives_dir.join(&stem);
            if !occupied(&candidate) {
                mkdir(&candidate)?;
                return Ok((candidate, true));
            }

            match self.policy {
                CollisionPolicy::Overwrite if candidate.is_dir() => Ok((candidate, false)),
                CollisionPolicy::Overwrite | CollisionPolicy::Fail => {
                    Err(OrganizeError::NameCollision {
                        source_path: archive.to_path_buf(),
                        destination: candidate,
                    })
                }
                CollisionPolicy::Rename => {
                    let free = (1..)
                        .map(|n| archives_dir.join(numbered_name(&stem, None, n)))
                        .find(|p| !occupied(p))
                        .unwrap_or(candidate);
                    mkdir(&free)?;
                    Ok((free, true))
                }
            }
        })
    }
}

fn unpack(archive: &Path, format: ArchiveFormat, destination: &Path) -> Result<usize, ExtractError> {
    match format {
        ArchiveFormat::Zip => unpack_zip(archive, destination),
        ArchiveFormat::Tar => unpack_tar(BufReader::new(File::open(archive)?), destination),
        ArchiveFormat::TarGz => unpack_tar(
            GzDecoder::new(BufReader::new(File::open(archive)?)),
            destination,
        ),
        ArchiveFormat::Gzip => unpack_gzip(archive, destination),
        ArchiveFormat::Rar => unpack_rar(archive, destination),
        ArchiveFormat::SevenZip => Err(ExtractError::Unsupported(format.to_string())),
    }
}

fn unpack_zip(archive: &Path, destination: &Path) -> Result<usize, ExtractError> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    let entries = zip.len();
    zip.extract(destination)?;
    Ok(entries)
}

fn unpack_tar<R: Read>(reader: R, destination: &Path) -> Result<usize, ExtractError> {
    let mut tar = TarArchive::new(reader);
    let mut entries = 0;
    for entry in tar.entries()? {
        // unpack_in refuses paths that would escape the destination
        if entry?.unpack_in(destination)? {
            entries += 1;
        }
    }
    Ok(entries)
}

fn unpack_gzip(archive: &Path, destination: &Path) -> Result<usize, ExtractError> {
    let name = archive
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "decompressed".into());
    let mut decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
    let mut out = File::create(destination.join(name))?;
    io::copy(&mut decoder, &mut out)?;
    Ok(1)
}

fn rar_error(err: impl fmt::Display) -> ExtractError {
    ExtractError::Rar(err.to_string())
}

fn unpack_rar(archive: &Path, destination: &Path) -> Result<usize, ExtractError> {
    let mut open = unrar::Archive::new(archive)
        .open_for_processing()
        .map_err(rar_error)?;
    let mut entries = 0;
    while let Some(header) = open.read_header().map_err(rar_error)? {
        open = if header.entry().is_file() {
            entries += 1;
            header.extract_with_base(destination).map_err(rar_error)?
        } else {
            header.skip().map_err(rar_error)?
        };
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    /// Single stored entry `hello.txt` containing "hello from rar\n" (RAR 4).
    const HELLO_RAR: &[u8] = &[
        0x52, 0x61, 0x72, 0x21, 0x1a, 0x07, 0x00, 0xcf, 0x90, 0x73, 0x00, 0x00,
        0x0d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x27, 0xe2, 0x74, 0x00,
        0x80, 0x29, 0x00, 0x0f, 0x00, 0x00, 0x00, 0x0f, 0x00, 0x00, 0x00, 0x00,
        0xe0, 0x12, 0xdc, 0xdb, 0x00, 0x00, 0x21, 0x58, 0x14, 0x30, 0x09, 0x00,
        0x20, 0x00, 0x00, 0x00, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x2e, 0x74, 0x78,
        0x74, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x66, 0x72, 0x6f, 0x6d, 0x20,
        0x72, 0x61, 0x72, 0x0a, 0xc4, 0x3d, 0x7b, 0x00, 0x40, 0x07, 0x00,
    ];

    fn extractor(root: &Path) -> ArchiveExtractor {
        ArchiveExtractor::new(root, CollisionPolicy::Rename)
    }

    #[test]
    fn test_zip_round_trip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("data.zip");
        write_zip(&archive, &[("A.txt", b"a"), ("B/C.txt", b"c")]);

        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].format, ArchiveFormat::Zip);
        assert_eq!(fs::read(root.join("archives/data/A.txt")).unwrap(), b"a");
        assert_eq!(fs::read(root.join("archives/data/B/C.txt")).unwrap(), b"c");
        assert!(!archive.exists());
    }

    #[test]
    fn test_tar_gz_strips_tar_suffix() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("backup.tar.gz");
        write_tar_gz(&archive, &[("docs/readme.txt", b"hi")]);

        assert_eq!(ArchiveFormat::detect(&archive), Some(ArchiveFormat::TarGz));
        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(fs::read(root.join("archives/backup/docs/readme.txt")).unwrap(), b"hi");
        assert!(!archive.exists());
    }

    #[test]
    fn test_gz_with_tar_inside_is_detected_by_content() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("bundle.gz");
        write_tar_gz(&archive, &[("x.txt", b"x")]);

        assert_eq!(ArchiveFormat::detect(&archive), Some(ArchiveFormat::TarGz));
    }

    #[test]
    fn test_plain_gzip_decompresses_single_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("notes.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
        encoder.write_all(b"hello").unwrap();
        encoder.finish().unwrap();

        assert_eq!(ArchiveFormat::detect(&archive), Some(ArchiveFormat::Gzip));
        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(
            fs::read(root.join("archives/notes.txt/notes.txt")).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_corrupt_archive_is_kept() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 definitely not a zip").unwrap();

        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.records.is_empty());
        assert!(matches!(
            outcome.failures.as_slice(),
            [OrganizeError::ExtractionFailed { .. }]
        ));
        assert!(archive.exists());
        assert!(!root.join("archives/broken").exists());
    }

    #[test]
    fn test_rar_round_trip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("greeting.rar");
        fs::write(&archive, HELLO_RAR).unwrap();

        assert_eq!(ArchiveFormat::detect(&archive), Some(ArchiveFormat::Rar));
        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].entries, 1);
        assert_eq!(
            fs::read(root.join("archives/greeting/hello.txt")).unwrap(),
            b"hello from rar\n"
        );
        assert!(!archive.exists());
    }

    #[test]
    fn test_corrupt_rar_is_kept() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("old.rar");
        fs::write(&archive, b"not a rar archive").unwrap();

        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert_eq!(outcome.failures.len(), 1);
        assert!(archive.exists());
    }

    #[test]
    fn test_seven_zip_left_untouched() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let archive = root.join("stuff.7z");
        fs::write(&archive, b"7z\xBC\xAF\x27\x1C\x00\x04").unwrap();

        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert!(outcome.records.is_empty());
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(matches!(outcome.skipped[0].reason, SkipReason::Unsupported(_)));
        assert!(archive.exists());
    }

    #[test]
    fn test_nested_archives_are_extracted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let inner_path = root.join("inner.zip");
        write_zip(&inner_path, &[("deep.txt", b"deep")]);
        let inner = fs::read(&inner_path).unwrap();
        fs::remove_file(&inner_path).unwrap();

        let outer = root.join("outer.zip");
        write_zip(&outer, &[("top.txt", b"top"), ("sub/inner.zip", &inner)]);

        let outcome = extractor(root).extract_all(&outer, &ExtensionTable::default(), 8);

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1].depth, 1);
        assert!(root.join("archives/outer/top.txt").exists());
        assert!(!root.join("archives/outer/sub/inner.zip").exists());
        assert_eq!(fs::read(root.join("archives/inner/deep.txt")).unwrap(), b"deep");
    }

    #[test]
    fn test_depth_limit_leaves_nested_archive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let inner_path = root.join("inner.zip");
        write_zip(&inner_path, &[("deep.txt", b"deep")]);
        let inner = fs::read(&inner_path).unwrap();
        fs::remove_file(&inner_path).unwrap();

        let outer = root.join("outer.zip");
        write_zip(&outer, &[("inner.zip", &inner)]);

        let outcome = extractor(root).extract_all(&outer, &ExtensionTable::default(), 0);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].reason, SkipReason::DepthLimit(1));
        assert!(root.join("archives/outer/inner.zip").exists());
    }

    #[test]
    fn test_existing_destination_is_renamed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("archives/data")).unwrap();
        let archive = root.join("data.zip");
        write_zip(&archive, &[("new.txt", b"new")]);

        let outcome = extractor(root).extract_all(&archive, &ExtensionTable::default(), 8);

        assert_eq!(outcome.records[0].destination, root.join("archives/data_1"));
        assert!(root.join("archives/data_1/new.txt").exists());
    }

    #[test]
    fn test_existing_destination_with_fail_policy() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("archives/data")).unwrap();
        let archive = root.join("data.zip");
        write_zip(&archive, &[("new.txt", b"new")]);

        let outcome = ArchiveExtractor::new(root, CollisionPolicy::Fail).extract_all(
            &archive,
            &ExtensionTable::default(),
            8,
        );

        assert!(matches!(
            outcome.failures.as_slice(),
            [OrganizeError::NameCollision { .. }]
        ));
        assert!(archive.exists());
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem(Path::new("a/photos.zip"), ArchiveFormat::Zip), "photos");
        assert_eq!(archive_stem(Path::new("b.tar.gz"), ArchiveFormat::TarGz), "b");
        assert_eq!(archive_stem(Path::new("b.TGZ"), ArchiveFormat::TarGz), "b");
        assert_eq!(archive_stem(Path::new("n.txt.gz"), ArchiveFormat::Gzip), "n.txt");
    }
}
