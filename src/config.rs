//! Sorting configuration.
//!
//! Settings are read from an optional TOML file given on the command line.
//! Nothing is discovered implicitly and no environment variables are read.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! collision = "rename"     # rename | overwrite | fail
//! max_archive_depth = 8
//! threads = 0              # 0 = one worker per CPU core
//!
//! [[categories]]           # appended after the built-in table
//! name = "documents"
//! extensions = ["md", "odt"]
//!
//! [filters]
//! skip_hidden = false
//! exclude_filenames = ["Thumbs.db"]
//! exclude_patterns = ["**/node_modules/**"]
//! exclude_regex = []
//! ```

use crate::file_category::{Category, DEFAULT_GROUPS, ExtensionTable};
use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Errors that can occur while loading or compiling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Unknown category '{0}', expected one of images, videos, documents, audio, archives")]
    UnknownCategory(String),
    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
}

/// What to do when the destination of a move or extraction already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Append `_1`, `_2`, ... to the stem until the name is free.
    #[default]
    Rename,
    /// Replace the existing file (or extract into the existing directory).
    Overwrite,
    /// Leave the source in place and report a name collision.
    Fail,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollisionPolicy::Rename => "rename",
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Fail => "fail",
        })
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rename" => Ok(CollisionPolicy::Rename),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "fail" => Ok(CollisionPolicy::Fail),
            other => Err(format!(
                "unknown collision policy '{}', expected rename, overwrite or fail",
                other
            )),
        }
    }
}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub sort: SortOptions,
    /// Extra classification groups, applied after the built-in ones.
    #[serde(default)]
    pub categories: Vec<CategoryRule>,
    #[serde(default)]
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortOptions {
    #[serde(default)]
    pub collision: CollisionPolicy,
    /// How many levels of archives-inside-archives are unpacked.
    #[serde(default = "default_max_archive_depth")]
    pub max_archive_depth: usize,
    /// Worker threads; 0 means one per CPU core.
    #[serde(default)]
    pub threads: usize,
}

fn default_max_archive_depth() -> usize {
    8
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::default(),
            max_archive_depth: default_max_archive_depth(),
            threads: 0,
        }
    }
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Files matching these rules are left where they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterRules {
    /// Skip files whose name starts with a dot.
    #[serde(default)]
    pub skip_hidden: bool,
    #[serde(default)]
    pub exclude_filenames: Vec<String>,
    /// Glob patterns matched against the path relative to the root.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Regexes matched against the file name.
    #[serde(default)]
    pub exclude_regex: Vec<String>,
}

impl SorterConfig {
    /// Loads configuration from `path`, or returns the defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Builds the extension table: built-in groups first, then configured ones.
    pub fn extension_table(&self) -> Result<ExtensionTable, ConfigError> {
        let extra = self
            .categories
            .iter()
            .map(|rule| {
                rule.name
                    .parse::<Category>()
                    .map(|category| (category, rule.extensions.clone()))
                    .map_err(ConfigError::UnknownCategory)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let defaults = DEFAULT_GROUPS
            .iter()
            .map(|(category, exts)| (*category, exts.iter().map(|e| e.to_string()).collect()));

        Ok(ExtensionTable::from_groups(
            defaults.chain(extra).collect::<Vec<(Category, Vec<String>)>>(),
        ))
    }

    /// Validates and pre-compiles the filter rules.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Filter rules with patterns compiled once.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude_regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_filenames: rules.exclude_filenames.iter().cloned().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns true if the file at `relative_path` (relative to the sort root)
    /// must be left alone.
    pub fn is_excluded(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.skip_hidden && file_name.starts_with('.') {
            return true;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return true;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        self.exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
