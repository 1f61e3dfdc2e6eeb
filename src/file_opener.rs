//! Opening entries with the platform's default application

use crate::error::{BroomError, Result};
use std::path::Path;
use tracing::debug;

/// Hands an entry over to an external application.
pub trait Opener {
    fn open(&mut self, path: &Path) -> Result<()>;
}

/// Uses the OS default handler without waiting for it to exit.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&mut self, path: &Path) -> Result<()> {
        open_file(path)
    }
}

/// Opens a file or folder with the default application.
pub fn open_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BroomError::NotFound(path.to_path_buf()));
    }

    debug!(path = %path.display(), "opening with default handler");
    open::that_detached(path).map_err(|e| BroomError::OpenFailed(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = open_file(Path::new("/nonexistent/broom/file.txt"));
        assert!(matches!(result, Err(BroomError::NotFound(_))));
    }
}
