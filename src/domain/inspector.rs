use super::size::{entry_size, format_size};
use super::{Category, ExtensionTable};
use crate::error::{BroomError, Result};
use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

/// Display-ready facts about one entry, computed fresh on every visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySummary {
    pub path: PathBuf,
    pub name: String,
    pub category: Category,
    pub size_bytes: u64,
    pub formatted_size: String,
    pub modified_date: NaiveDate,
}

/// Classifies, sizes and dates the entry at `path`.
///
/// Directories are sized recursively. Stat failures surface as
/// `NotFound`/`PermissionDenied` so the caller can skip the entry.
pub fn inspect(table: &ExtensionTable, path: &Path) -> Result<EntrySummary> {
    let metadata = fs::metadata(path).map_err(|e| BroomError::from_io(e, path))?;

    let category = table.classify_suffix(&super::suffix_of(path), metadata.is_dir());
    let size_bytes = entry_size(path)?;

    let modified = metadata
        .modified()
        .map_err(|e| BroomError::from_io(e, path))?;
    let modified_date = DateTime::<Local>::from(modified).date_naive();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(EntrySummary {
        path: path.to_path_buf(),
        name,
        category,
        size_bytes,
        formatted_size: format_size(size_bytes),
        modified_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.jpg");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        let summary = inspect(&ExtensionTable::default(), &path).unwrap();
        assert_eq!(summary.name, "photo.jpg");
        assert_eq!(summary.category, Category::Image);
        assert_eq!(summary.size_bytes, 2048);
        assert_eq!(summary.formatted_size, "2.0 Ko");
        let mtime = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(summary.modified_date, DateTime::<Local>::from(mtime).date_naive());
    }

    #[test]
    fn test_inspect_folder_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("album");
        fs::create_dir_all(folder.join("inner")).unwrap();
        fs::write(folder.join("a.txt"), vec![1u8; 100]).unwrap();
        fs::write(folder.join("inner").join("b.txt"), vec![1u8; 50]).unwrap();

        let summary = inspect(&ExtensionTable::default(), &folder).unwrap();
        assert_eq!(summary.category, Category::Folder);
        assert_eq!(summary.size_bytes, 150);
    }

    #[test]
    fn test_inspect_empty_file_formats_as_dash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.log");
        fs::write(&path, b"").unwrap();

        let summary = inspect(&ExtensionTable::default(), &path).unwrap();
        assert_eq!(summary.category, Category::Unrecognized);
        assert_eq!(summary.formatted_size, "-");
    }

    #[test]
    fn test_inspect_vanished_entry() {
        let temp_dir = TempDir::new().unwrap();
        let result = inspect(&ExtensionTable::default(), &temp_dir.path().join("gone.mp4"));
        assert!(matches!(result, Err(BroomError::NotFound(_))));
    }
}
