//! Size calculation and formatting for triaged entries.
//!
//! Sizes are `u64` bytes everywhere; floating point only shows up when
//! formatting for display.

use crate::error::{BroomError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const KO: f64 = 1024.0;
const MO: f64 = KO * 1024.0;
const GO: f64 = MO * 1024.0;

/// Exact byte length of a regular file.
pub fn file_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| BroomError::from_io(e, path))?;
    Ok(metadata.len())
}

/// Sum of every regular file below `path`.
///
/// Symlinks are not followed, so link cycles cannot recurse forever. Entries
/// that disappear mid-walk are skipped.
pub fn directory_size(path: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| BroomError::from_io(e, path))?;
    if !metadata.is_dir() {
        return Ok(0);
    }

    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry during size walk");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(m) => total += m.len(),
            Err(e) => debug!(path = %entry.path().display(), error = %e, "skipping file"),
        }
    }

    Ok(total)
}

/// Size of a top-level entry: recursive for directories, 0 for anything
/// that is neither a file nor a directory.
pub fn entry_size(path: &Path) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| BroomError::from_io(e, path))?;
    if metadata.is_dir() {
        directory_size(path)
    } else if metadata.is_file() {
        Ok(metadata.len())
    } else {
        Ok(0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Formats a byte count as `Ko`, `Mo` or `Go` with one decimal, `-` for zero.
///
/// The unit is picked from the megabyte value rounded to one decimal: above
/// 999 it switches to `Go`, below 1 it drops to `Ko`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "-".to_string();
    }

    let b = bytes as f64;
    let mb = round1(b / MO);
    if mb > 999.0 {
        format!("{:.1} Go", round1(b / GO))
    } else if mb < 1.0 {
        format!("{:.1} Ko", round1(b / KO))
    } else {
        format!("{:.1} Mo", mb)
    }
}
