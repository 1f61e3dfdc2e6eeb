//! Folder-wide size breakdown, computed once before triage starts.

use super::inspector::inspect;
use super::{is_ignored, Category, ExtensionTable};
use std::path::PathBuf;
use tracing::warn;

/// Size and count totals for a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: Category,
    pub total_size: u64,
    pub entry_count: u64,
}

impl CategoryStats {
    /// Share of `total` in percent; 0 when `total` is 0.
    pub fn percentage(&self, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.total_size as f64 * 100.0 / total as f64
        }
    }
}

/// Snapshot of the working directory taken at scan time. Moves made during
/// triage do not update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderStats {
    per_category: [CategoryStats; 7],
    total_bytes: u64,
}

impl Default for FolderStats {
    fn default() -> Self {
        Self {
            per_category: Category::ALL.map(|category| CategoryStats {
                category,
                total_size: 0,
                entry_count: 0,
            }),
            total_bytes: 0,
        }
    }
}

impl FolderStats {
    /// Inspects every non-ignored entry once and accumulates per-category
    /// totals. Entries that cannot be inspected are left out of the report.
    pub fn aggregate(table: &ExtensionTable, entries: &[PathBuf]) -> Self {
        let mut stats = Self::default();

        for path in entries {
            let ignored = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_ignored);
            if ignored {
                continue;
            }

            match inspect(table, path) {
                Ok(summary) => stats.record(summary.category, summary.size_bytes),
                Err(e) => warn!(path = %path.display(), error = %e, "left out of folder stats"),
            }
        }

        stats
    }

    pub fn record(&mut self, category: Category, size: u64) {
        let slot = &mut self.per_category[category.index()];
        slot.total_size += size;
        slot.entry_count += 1;
        self.total_bytes += size;
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn get(&self, category: Category) -> &CategoryStats {
        &self.per_category[category.index()]
    }

    /// Categories holding at least one entry, largest first. Equal sizes keep
    /// the `Category` order.
    pub fn ranked(&self) -> Vec<CategoryStats> {
        let mut ranked: Vec<CategoryStats> = self
            .per_category
            .iter()
            .filter(|s| s.entry_count > 0)
            .copied()
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.total_size.cmp(&a.total_size));
        ranked
    }
}
