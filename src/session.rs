//! A brooming session: scan the working directory, triage every entry, then
//! offer to purge staged deletions and to start over.

use crate::config::PreviewSettings;
use crate::console;
use crate::domain::{
    inspect, is_ignored, ExtensionTable, FolderStats, StagingDirs, TriageMachine, TriageOutcome,
};
use crate::error::{BroomError, Result};
use crate::file_opener::Opener;
use crate::preview::Previewer;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const PURGE_QUESTION: &str = "❗ Would you like to destroy broomed files ?";
const REBROOM_QUESTION: &str = "❔ Would you like to Rebroom the folder ?";

/// Tally of one pass over the working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub kept: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub purged: bool,
}

impl SessionReport {
    fn record(&mut self, outcome: &TriageOutcome) {
        match outcome {
            TriageOutcome::Kept(_) => self.kept += 1,
            TriageOutcome::Deleted(_) => self.deleted += 1,
            TriageOutcome::Skipped => self.skipped += 1,
        }
    }
}

pub struct BroomSession<R, W, P, O> {
    root: PathBuf,
    table: ExtensionTable,
    settings: PreviewSettings,
    input: R,
    out: W,
    previewer: P,
    opener: O,
}

impl<R, W, P, O> BroomSession<R, W, P, O>
where
    R: BufRead,
    W: Write,
    P: Previewer,
    O: Opener,
{
    pub fn new(
        root: impl Into<PathBuf>,
        settings: PreviewSettings,
        input: R,
        out: W,
        previewer: P,
        opener: O,
    ) -> Self {
        Self {
            root: root.into(),
            table: ExtensionTable::default(),
            settings,
            input,
            out,
            previewer,
            opener,
        }
    }

    pub fn with_table(mut self, table: ExtensionTable) -> Self {
        self.table = table;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn previewer(&self) -> &P {
        &self.previewer
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Runs sessions until the operator declines to rebroom and returns one
    /// report per session.
    pub fn run(&mut self) -> Result<Vec<SessionReport>> {
        let mut reports = Vec::new();

        loop {
            reports.push(self.broom_once()?);
            if !console::confirm(&mut self.input, &mut self.out, REBROOM_QUESTION)? {
                break;
            }
            info!(root = %self.root.display(), "rebrooming");
        }

        self.previewer.stop_audio();
        StagingDirs::remove_if_empty(StagingDirs::new(&self.root).kept())?;
        Ok(reports)
    }

    /// Top-level entries of the working directory minus the ignore set,
    /// sorted by name.
    pub fn list_candidates(&self) -> Result<Vec<PathBuf>> {
        let read_dir_error = |source| BroomError::ReadDir {
            path: self.root.clone(),
            source,
        };

        let mut candidates = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            let ignored = entry.file_name().to_str().is_some_and(is_ignored);
            if !ignored {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        Ok(candidates)
    }

    /// One full pass: stats report, triage of every candidate, purge offer.
    pub fn broom_once(&mut self) -> Result<SessionReport> {
        let candidates = self.list_candidates()?;
        let staging = StagingDirs::ensure(&self.root)?;
        info!(root = %self.root.display(), entries = candidates.len(), "session started");

        console::render_banner(&mut self.out)?;
        let stats = FolderStats::aggregate(&self.table, &candidates);
        console::render_stats(&mut self.out, &stats)?;

        let mut report = SessionReport::default();
        for path in &candidates {
            let summary = match inspect(&self.table, path) {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping entry");
                    console::render_warning(&mut self.out, &e.to_string())?;
                    report.failed += 1;
                    continue;
                }
            };

            console::render_entry(&mut self.out, &summary)?;
            let outcome = TriageMachine {
                staging: &staging,
                settings: &self.settings,
                previewer: &mut self.previewer,
                opener: &mut self.opener,
                input: &mut self.input,
                out: &mut self.out,
            }
            .run(&summary);

            match outcome {
                Ok(outcome) => {
                    console::render_outcome(&mut self.out, &outcome)?;
                    report.record(&outcome);
                }
                Err(e) if e.is_transient() => {
                    warn!(entry = %summary.name, error = %e, "entry left in place");
                    console::render_warning(&mut self.out, &e.to_string())?;
                    report.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        console::render_tally(&mut self.out, &report)?;
        console::render_broomed(&mut self.out)?;
        report.purged = self.offer_purge(&staging)?;
        info!(
            kept = report.kept,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "session finished"
        );
        Ok(report)
    }

    fn offer_purge(&mut self, staging: &StagingDirs) -> Result<bool> {
        if StagingDirs::remove_if_empty(staging.deleted())? {
            return Ok(false);
        }

        let size = staging.deleted_size()?;
        console::render_pending_deletion(&mut self.out, size)?;
        if !console::confirm(&mut self.input, &mut self.out, PURGE_QUESTION)? {
            return Ok(false);
        }

        staging.purge_deleted()?;
        console::render_purged(&mut self.out)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DELETED_DIR, KEPT_DIR};
    use std::io::Cursor;
    use tempfile::TempDir;

    struct SilentPreviewer;

    impl Previewer for SilentPreviewer {
        fn show_image(&mut self, _path: &Path, _out: &mut dyn Write) -> Result<()> {
            Ok(())
        }

        fn play_audio(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }

        fn stop_audio(&mut self) {}

        fn sample_video_frames(
            &mut self,
            _path: &Path,
            _max_frames: usize,
            _out: &mut dyn Write,
        ) -> Result<()> {
            Ok(())
        }

        fn render_table(&mut self, _path: &Path, _max_rows: usize) -> Result<Vec<Vec<String>>> {
            Ok(Vec::new())
        }

        fn extract_text(&mut self, _path: &Path, _max_chars: usize) -> Result<String> {
            Ok(String::new())
        }

        fn extract_first_page_text(&mut self, _path: &Path, _max_chars: usize) -> Result<String> {
            Ok(String::new())
        }
    }

    struct NoOpener;

    impl Opener for NoOpener {
        fn open(&mut self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    type TestSession = BroomSession<Cursor<Vec<u8>>, Vec<u8>, SilentPreviewer, NoOpener>;

    fn session(root: &Path, script: &str) -> TestSession {
        session_from_bytes(root, script.as_bytes())
    }

    fn session_from_bytes(root: &Path, script: &[u8]) -> TestSession {
        BroomSession::new(
            root,
            PreviewSettings::default(),
            Cursor::new(script.to_vec()),
            Vec::new(),
            SilentPreviewer,
            NoOpener,
        )
    }

    fn output(session: &TestSession) -> String {
        String::from_utf8(session.output().clone()).unwrap()
    }

    #[test]
    fn test_list_candidates_sorted_without_ignored() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "main.py", ".vscode", "broom"] {
            fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(temp_dir.path().join(KEPT_DIR)).unwrap();

        let names: Vec<String> = session(temp_dir.path(), "")
            .list_candidates()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = session(&missing, "").run();
        assert!(matches!(result, Err(BroomError::ReadDir { .. })));
        assert!(!missing.exists());
    }

    #[test]
    fn test_empty_deleted_dir_removed_without_prompt() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"x").unwrap();

        let mut session = session(temp_dir.path(), "\nn\n");
        let reports = session.run().unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].skipped, 1);
        assert!(!output(&session).contains("destroy broomed files"));
        assert!(!temp_dir.path().join(DELETED_DIR).exists());
        assert!(!temp_dir.path().join(KEPT_DIR).exists());
    }

    #[test]
    fn test_purge_removes_deleted_tree() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"x").unwrap();

        let mut session = session(temp_dir.path(), "d\ny\nn\n");
        let reports = session.run().unwrap();

        assert_eq!(reports[0].deleted, 1);
        assert!(reports[0].purged);
        assert!(output(&session).contains("BROOMED FILES WERE DELETED"));
        assert!(!temp_dir.path().join(DELETED_DIR).exists());
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_declined_purge_keeps_staged_entries() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"x").unwrap();

        let mut session = session(temp_dir.path(), "d\nyes\n");
        let reports = session.run().unwrap();

        assert!(!reports[0].purged);
        assert!(temp_dir.path().join(DELETED_DIR).join("a.txt").exists());
    }

    #[test]
    fn test_rebroom_runs_another_session() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"x").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"x").unwrap();

        let mut session = session(temp_dir.path(), "k\n\ny\n\nn\n");
        let reports = session.run().unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].kept, 1);
        assert_eq!(reports[0].skipped, 1);
        assert_eq!(
            reports[1],
            SessionReport {
                skipped: 1,
                ..SessionReport::default()
            }
        );
        assert_eq!(
            output(&session).matches("--- Starting brooming ---").count(),
            2
        );
        assert!(temp_dir.path().join(KEPT_DIR).join("a.txt").exists());
    }

    #[test]
    fn test_invalid_utf8_answers_skip_and_decline() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"x").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"x").unwrap();

        let mut session = session_from_bytes(temp_dir.path(), b"\xff\xfe\nd\n\xff\n\xff\n");
        let reports = session.run().unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].skipped, 1);
        assert_eq!(reports[0].deleted, 1);
        assert_eq!(reports[0].failed, 0);
        assert!(!reports[0].purged);
        assert!(temp_dir.path().join("a.txt").exists());
        assert!(temp_dir.path().join(DELETED_DIR).join("b.txt").exists());
        assert!(!output(&session).contains("IO error"));
    }

    #[test]
    fn test_custom_table_changes_categories() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();

        let mut table = ExtensionTable::default();
        table.document.retain(|suffix| *suffix != ".txt");
        table.archive.push(".txt");

        let mut session = session(temp_dir.path(), "\nn\n").with_table(table);
        assert_eq!(session.root(), temp_dir.path());
        session.run().unwrap();

        let text = output(&session);
        let start = text.find("Folder overview").unwrap();
        let report = &text[start..start + text[start..].find("total").unwrap()];
        assert!(report.contains("archive"));
        assert!(!report.contains("document"));
    }

    #[test]
    fn test_failed_move_counts_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(KEPT_DIR)).unwrap();
        fs::write(temp_dir.path().join(KEPT_DIR).join("a.txt"), b"old").unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"new").unwrap();
        fs::write(temp_dir.path().join("b.txt"), b"x").unwrap();

        let mut session = session(temp_dir.path(), "k\nk\nn\n");
        let reports = session.run().unwrap();

        assert_eq!(reports[0].failed, 1);
        assert_eq!(reports[0].kept, 1);
        assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"new");
        assert_eq!(
            fs::read(temp_dir.path().join(KEPT_DIR).join("a.txt")).unwrap(),
            b"old"
        );
        assert!(output(&session).contains("Destination already exists"));
    }
}
