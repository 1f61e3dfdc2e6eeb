//! Error types for broom

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BroomError {
    #[error("Entry not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("No preview available: {0}")]
    PreviewUnavailable(String),

    #[error("Failed to open: {0}")]
    OpenFailed(String),

    #[error("Cannot read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BroomError {
    /// Maps an I/O failure on `path` to the matching variant.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => BroomError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => BroomError::PermissionDenied(path.to_path_buf()),
            _ => BroomError::Io(err),
        }
    }

    /// Whether the error only concerns a single entry and the session can go on.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BroomError::ReadDir { .. })
    }
}

pub type Result<T> = std::result::Result<T, BroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let mapped = BroomError::from_io(err, Path::new("a.txt"));
        assert!(matches!(mapped, BroomError::NotFound(p) if p == Path::new("a.txt")));
    }

    #[test]
    fn test_from_io_permission_denied() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let mapped = BroomError::from_io(err, Path::new("secret"));
        assert!(matches!(mapped, BroomError::PermissionDenied(_)));
    }

    #[test]
    fn test_from_io_other_kinds_stay_io() {
        let err = io::Error::other("boom");
        let mapped = BroomError::from_io(err, Path::new("x"));
        assert!(matches!(mapped, BroomError::Io(_)));
    }

    #[test]
    fn test_read_dir_is_not_transient() {
        let err = BroomError::ReadDir {
            path: PathBuf::from("."),
            source: io::Error::other("denied"),
        };
        assert!(!err.is_transient());
        assert!(BroomError::NotFound(PathBuf::from("x")).is_transient());
    }
}
