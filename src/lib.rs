//! dirsort - sort a directory tree in place
//!
//! This library walks a directory, moves files into category folders
//! (`images/`, `videos/`, `documents/`, `audio/`) under transliterated names,
//! unpacks archives into `archives/<name>/` and removes the directories left
//! empty. Extension groups, collision handling and exclusion filters can be
//! configured from a TOML file.

pub mod cli;
pub mod config;
pub mod extractor;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod pruner;
pub mod sorter;
pub mod transliterate;
pub mod walker;

pub use config::{CollisionPolicy, CompiledFilters, ConfigError, SorterConfig};
pub use extractor::{ArchiveExtractor, ArchiveFormat, ExtractError, ExtractionRecord};
pub use file_category::{Category, ExtensionTable};
pub use file_organizer::{FileMover, MoveRecord, OrganizeError, OrganizeResult};
pub use pruner::{PruneReport, prune_empty_dirs};
pub use sorter::{SortPlan, SortReport, Sorter};
pub use transliterate::normalize;
pub use walker::DirectoryWalker;

pub use cli::{Cli, run_cli};
