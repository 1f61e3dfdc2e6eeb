pub mod inspector;
pub mod size;
pub mod staging;
pub mod stats;
pub mod triage;

use std::path::Path;

pub use inspector::{inspect, EntrySummary};
pub use size::{directory_size, entry_size, file_size, format_size};
pub use staging::StagingDirs;
pub use stats::{CategoryStats, FolderStats};
pub use triage::{
    document_preview, preview_entry, transition, Command, Destination, DocumentPreview, Effect,
    TriageMachine, TriageOutcome, TriageState,
};

/// Names never scanned nor moved: the staging directories and the tool's own files.
pub const IGNORED_NAMES: &[&str] = &[
    KEPT_DIR,
    DELETED_DIR,
    ".vscode",
    "main.py",
    "broom.py",
    "broom",
    "broom.exe",
];

pub const KEPT_DIR: &str = "_to_be_kept";
pub const DELETED_DIR: &str = "_to_be_deleted";

pub fn is_ignored(name: &str) -> bool {
    IGNORED_NAMES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Image,
    Document,
    Audio,
    Video,
    Archive,
    Folder,
    Unrecognized,
}

impl Category {
    /// All categories in their fixed order. Suffix lookups and tie-breaks follow it.
    pub const ALL: [Category; 7] = [
        Category::Image,
        Category::Document,
        Category::Audio,
        Category::Video,
        Category::Archive,
        Category::Folder,
        Category::Unrecognized,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archive => "archive",
            Category::Folder => "folder",
            Category::Unrecognized => "undefined",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Image => "📸",
            Category::Document => "📄",
            Category::Audio => "🎵",
            Category::Video => "🎬",
            Category::Archive => "📚",
            Category::Folder => "📂",
            Category::Unrecognized => "🔹",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Returns the path's suffix with its leading dot, or an empty string.
///
/// Dot-files such as `.bashrc` have no suffix.
pub fn suffix_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}

/// Suffix tables used to classify entries.
///
/// Matching is literal and case-sensitive; the tables deliberately keep their
/// mixed-case variants and duplicates.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    pub image: Vec<&'static str>,
    pub document: Vec<&'static str>,
    pub audio: Vec<&'static str>,
    pub video: Vec<&'static str>,
    pub archive: Vec<&'static str>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self {
            image: vec![
                ".jpg", ".JPG", ".jpeg", ".JPEG", ".png", ".gif", ".bmp", ".tiff", ".webp", ".ico",
                ".raw", ".heif", ".bat", ".indd",
            ],
            document: vec![
                ".doc", ".docx", ".pdf", ".txt", ".rtf", ".odt", ".xls", ".xlsx", ".ppt", ".pptx",
                ".csv", ".pages", ".key", ".numbers", ".txt", ".md", ".html", ".epub",
            ],
            audio: vec![
                ".mp3", ".wav", ".aac", ".flac", ".ogg", ".wma", ".m4a", ".aiff", ".alac", ".ape",
                ".dsd", ".dff", ".dsf", ".mp2", ".amr", ".au", ".ra", ".wv",
            ],
            video: vec![
                ".mp4", ".mkv", ".avi", ".flv", ".wmv", ".mov", ".mpg", ".mpeg", ".3gp", ".m4v",
                ".webm", ".ogg", ".m2ts", ".ts", ".mts", ".hevc", ".vp9", ".vp8", ".asf", ".rm",
                ".swf", ".drc", ".gifv", ".m2v", ".mxf", ".roq", ".nsv",
            ],
            archive: vec![
                ".zip", ".rar", ".7z", ".tar", ".gz", ".tgz", ".bz2", ".xz", ".lzma", ".arj",
                ".cab", ".chm", ".deb", ".dmg", ".iso", ".lzh", ".msi", ".rpm", ".udf", ".wim",
                ".xar",
            ],
        }
    }
}

impl ExtensionTable {
    /// Suffixes owned by `category`, in priority order. Folder and
    /// Unrecognized own none.
    pub fn suffixes(&self, category: Category) -> &[&'static str] {
        match category {
            Category::Image => &self.image,
            Category::Document => &self.document,
            Category::Audio => &self.audio,
            Category::Video => &self.video,
            Category::Archive => &self.archive,
            Category::Folder | Category::Unrecognized => &[],
        }
    }

    pub fn classify_suffix(&self, suffix: &str, is_dir: bool) -> Category {
        let hit = [
            Category::Image,
            Category::Document,
            Category::Audio,
            Category::Video,
            Category::Archive,
        ]
        .into_iter()
        .find(|&category| !suffix.is_empty() && self.suffixes(category).contains(&suffix));

        match hit {
            Some(category) => category,
            None if is_dir => Category::Folder,
            None => Category::Unrecognized,
        }
    }

    pub fn classify(&self, path: &Path) -> Category {
        self.classify_suffix(&suffix_of(path), path.is_dir())
    }
}
