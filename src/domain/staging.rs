use super::size::directory_size;
use super::triage::Destination;
use super::{DELETED_DIR, KEPT_DIR};
use crate::error::{BroomError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The `_to_be_kept` and `_to_be_deleted` directories of a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDirs {
    kept: PathBuf,
    deleted: PathBuf,
}

impl StagingDirs {
    pub fn new(root: &Path) -> Self {
        Self {
            kept: root.join(KEPT_DIR),
            deleted: root.join(DELETED_DIR),
        }
    }

    /// Creates both directories when absent. Calling it again is a no-op.
    pub fn ensure(root: &Path) -> Result<Self> {
        let dirs = Self::new(root);
        for dir in [&dirs.kept, &dirs.deleted] {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| BroomError::from_io(e, dir))?;
                info!(path = %dir.display(), "created staging directory");
            }
        }
        Ok(dirs)
    }

    pub fn kept(&self) -> &Path {
        &self.kept
    }

    pub fn deleted(&self) -> &Path {
        &self.deleted
    }

    pub fn dir_for(&self, destination: Destination) -> &Path {
        match destination {
            Destination::Kept => &self.kept,
            Destination::Deleted => &self.deleted,
        }
    }

    /// Renames `entry` into the staging directory under its base name.
    ///
    /// Refuses to overwrite a previously staged entry of the same name; on
    /// any failure the entry stays where it was.
    pub fn move_into(&self, entry: &Path, destination: Destination) -> Result<PathBuf> {
        let name = entry
            .file_name()
            .ok_or_else(|| BroomError::NotFound(entry.to_path_buf()))?;
        let target = self.dir_for(destination).join(name);

        if fs::symlink_metadata(&target).is_ok() {
            return Err(BroomError::DestinationExists(target));
        }

        fs::rename(entry, &target).map_err(|e| BroomError::from_io(e, entry))?;
        info!(from = %entry.display(), to = %target.display(), "moved entry");
        Ok(target)
    }

    /// Bytes currently staged for deletion; 0 when the directory is gone.
    pub fn deleted_size(&self) -> Result<u64> {
        if !self.deleted.exists() {
            return Ok(0);
        }
        directory_size(&self.deleted)
    }

    /// Irreversibly removes the deletion staging directory and its content.
    pub fn purge_deleted(&self) -> Result<()> {
        fs::remove_dir_all(&self.deleted).map_err(|e| BroomError::from_io(e, &self.deleted))?;
        info!(path = %self.deleted.display(), "purged staged deletions");
        Ok(())
    }

    /// Removes `dir` only when it has no entries. Returns whether it was removed.
    pub fn remove_if_empty(dir: &Path) -> Result<bool> {
        let mut entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(BroomError::from_io(e, dir)),
        };
        if entries.next().is_some() {
            return Ok(false);
        }

        fs::remove_dir(dir).map_err(|e| BroomError::from_io(e, dir))?;
        info!(path = %dir.display(), "removed empty staging directory");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_creates_both() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        assert!(dirs.kept().is_dir());
        assert!(dirs.deleted().is_dir());
        assert!(dirs.kept().ends_with("_to_be_kept"));
        assert!(dirs.deleted().ends_with("_to_be_deleted"));
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let first = StagingDirs::ensure(temp_dir.path()).unwrap();
        fs::write(first.kept().join("earlier.txt"), b"kept").unwrap();

        let second = StagingDirs::ensure(temp_dir.path()).unwrap();
        assert_eq!(first, second);
        assert!(second.kept().join("earlier.txt").exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_move_into_kept() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, b"jpeg").unwrap();

        let target = dirs.move_into(&file, Destination::Kept).unwrap();
        assert_eq!(target, dirs.kept().join("photo.jpg"));
        assert!(!file.exists());
        assert!(target.exists());
    }

    #[test]
    fn test_move_whole_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        let folder = temp_dir.path().join("album");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("a.png"), b"png").unwrap();

        let target = dirs.move_into(&folder, Destination::Deleted).unwrap();
        assert!(!folder.exists());
        assert!(target.join("a.png").exists());
    }

    #[test]
    fn test_move_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        fs::write(dirs.deleted().join("notes.txt"), b"old").unwrap();
        let file = temp_dir.path().join("notes.txt");
        fs::write(&file, b"new").unwrap();

        let result = dirs.move_into(&file, Destination::Deleted);
        assert!(matches!(result, Err(BroomError::DestinationExists(_))));
        assert!(file.exists());
        assert_eq!(fs::read(dirs.deleted().join("notes.txt")).unwrap(), b"old");
    }

    #[test]
    fn test_move_vanished_entry() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        let result = dirs.move_into(&temp_dir.path().join("gone.txt"), Destination::Kept);
        assert!(matches!(result, Err(BroomError::NotFound(_))));
    }

    #[test]
    fn test_deleted_size_and_purge() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        assert_eq!(dirs.deleted_size().unwrap(), 0);

        fs::write(dirs.deleted().join("junk.bin"), vec![0u8; 100]).unwrap();
        assert_eq!(dirs.deleted_size().unwrap(), 100);

        dirs.purge_deleted().unwrap();
        assert!(!dirs.deleted().exists());
        assert_eq!(dirs.deleted_size().unwrap(), 0);
    }

    #[test]
    fn test_remove_if_empty() {
        let temp_dir = TempDir::new().unwrap();
        let dirs = StagingDirs::ensure(temp_dir.path()).unwrap();
        fs::write(dirs.kept().join("keep.me"), b"x").unwrap();

        assert!(!StagingDirs::remove_if_empty(dirs.kept()).unwrap());
        assert!(dirs.kept().exists());
        assert!(StagingDirs::remove_if_empty(dirs.deleted()).unwrap());
        assert!(!dirs.deleted().exists());
        assert!(!StagingDirs::remove_if_empty(dirs.deleted()).unwrap());
    }
}
