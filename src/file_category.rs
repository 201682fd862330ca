/// Extension-based file classification.
///
/// Files are sorted into a closed set of categories. The mapping from extension
/// to category is an [`ExtensionTable`] built once from an ordered list of
/// groups and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::{Category, ExtensionTable};
///
/// let table = ExtensionTable::default();
/// assert_eq!(table.classify("JPG"), Some(Category::Image));
/// assert_eq!(table.classify("docx"), Some(Category::Document));
/// assert_eq!(table.classify("exe"), None);
/// ```
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// A sorting bucket. Each category owns a directory directly under the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Image files (JPEG, PNG, SVG, ...)
    Image,
    /// Video files (AVI, MP4, MKV, ...)
    Video,
    /// Document files (DOCX, PDF, TXT, ...)
    Document,
    /// Audio files (MP3, OGG, WAV, ...)
    Audio,
    /// Archives. Not moved, unpacked into `archives/<stem>/` instead.
    Archive,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 5] = [
        Category::Image,
        Category::Video,
        Category::Document,
        Category::Audio,
        Category::Archive,
    ];

    /// Returns the directory name for this category.
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "images");
    /// assert_eq!(Category::Archive.dir_name(), "archives");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Video => "videos",
            Category::Document => "documents",
            Category::Audio => "audio",
            Category::Archive => "archives",
        }
    }

    /// Looks up a category by its directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// Returns true if `name` is the directory name of any category.
    pub fn is_category_dir(name: &str) -> bool {
        Self::from_dir_name(name).is_some()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dir_name(&s.to_lowercase()).ok_or_else(|| s.to_string())
    }
}

/// The built-in groups, in declaration order.
pub const DEFAULT_GROUPS: &[(Category, &[&str])] = &[
    (Category::Image, &["jpeg", "png", "jpg", "svg", "bmp"]),
    (Category::Video, &["avi", "mp4", "mov", "mkv"]),
    (
        Category::Document,
        &["doc", "docx", "txt", "pdf", "xlsx", "pptx"],
    ),
    (Category::Audio, &["mp3", "ogg", "wav", "amr"]),
    (Category::Archive, &["zip", "gz", "tgz", "tar", "rar", "7z"]),
];

/// Maps lowercase extensions to categories.
///
/// Built from `(category, extensions)` groups. When an extension is declared in
/// more than one group the last declaration wins.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    extension_map: HashMap<String, Category>,
}

impl ExtensionTable {
    /// Builds a table from ordered groups. Later groups override earlier ones.
    pub fn from_groups<I, E, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (Category, E)>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extension_map = HashMap::new();
        for (category, extensions) in groups {
            for ext in extensions {
                let ext = ext.as_ref().trim_start_matches('.').to_lowercase();
                if let Some(previous) = extension_map.insert(ext.clone(), category)
                    && previous != category
                {
                    tracing::debug!(%ext, from = %previous, to = %category, "extension remapped");
                }
            }
        }
        Self { extension_map }
    }

    /// Maps an extension (with or without leading dot, any case) to its category.
    pub fn classify(&self, ext: &str) -> Option<Category> {
        self.extension_map
            .get(&ext.trim_start_matches('.').to_lowercase())
            .copied()
    }

    /// Returns true if the extension is classified as an archive.
    pub fn is_archive(&self, ext: &str) -> bool {
        self.classify(ext) == Some(Category::Archive)
    }

    /// All known extensions, sorted.
    pub fn extensions(&self) -> BTreeSet<&str> {
        self.extension_map.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.extension_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extension_map.is_empty()
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::from_groups(DEFAULT_GROUPS.iter().map(|(c, exts)| (*c, exts.iter())))
    }
}
