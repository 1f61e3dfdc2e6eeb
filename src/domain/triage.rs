use super::staging::StagingDirs;
use super::{suffix_of, Category, EntrySummary};
use crate::config::PreviewSettings;
use crate::console;
use crate::error::{BroomError, Result};
use crate::file_opener::Opener;
use crate::preview::Previewer;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageState {
    Prompting,
    Previewing,
    Opening,
    MovedToKept,
    MovedToDeleted,
    SkippedInPlace,
}

impl TriageState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TriageState::MovedToKept | TriageState::MovedToDeleted | TriageState::SkippedInPlace
        )
    }
}

/// What the operator asked for at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Delete,
    Keep,
    Open,
    Preview,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Kept,
    Deleted,
}

/// Side effect requested by a transition; executed by `TriageMachine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Move(Destination),
    Open,
    Preview,
}

/// Where an entry ended up once its triage finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    Kept(PathBuf),
    Deleted(PathBuf),
    Skipped,
}

/// Pure transition function of the triage loop.
///
/// `Previewing` and `Opening` always fall back to `Prompting` once their
/// effect ran; terminal states never move again.
pub fn transition(state: TriageState, command: Command) -> (TriageState, Effect) {
    match state {
        TriageState::Prompting => match command {
            Command::Delete => (
                TriageState::MovedToDeleted,
                Effect::Move(Destination::Deleted),
            ),
            Command::Keep => (TriageState::MovedToKept, Effect::Move(Destination::Kept)),
            Command::Open => (TriageState::Opening, Effect::Open),
            Command::Preview => (TriageState::Previewing, Effect::Preview),
            Command::Skip => (TriageState::SkippedInPlace, Effect::None),
        },
        TriageState::Previewing | TriageState::Opening => (TriageState::Prompting, Effect::None),
        terminal => (terminal, Effect::None),
    }
}

/// How a document is previewed, picked from its suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPreview {
    Table,
    Text,
    FirstPage,
}

pub fn document_preview(suffix: &str) -> Option<DocumentPreview> {
    match suffix {
        ".csv" | ".xls" | ".xlsx" | ".numbers" => Some(DocumentPreview::Table),
        ".txt" | ".md" | ".doc" | ".docx" | ".htm" | ".html" | ".rtf" | ".odt" => {
            Some(DocumentPreview::Text)
        }
        ".pdf" => Some(DocumentPreview::FirstPage),
        _ => None,
    }
}

fn list_children(path: &Path) -> Result<Vec<String>> {
    let mut names = fs::read_dir(path)
        .map_err(|e| BroomError::from_io(e, path))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

fn unavailable(reason: &str) -> BroomError {
    BroomError::PreviewUnavailable(reason.to_string())
}

/// Previews one entry according to its category. Never moves the entry.
pub fn preview_entry(
    summary: &EntrySummary,
    previewer: &mut dyn Previewer,
    settings: &PreviewSettings,
    out: &mut dyn Write,
) -> Result<()> {
    let path = summary.path.as_path();
    let suffix = suffix_of(path);

    match summary.category {
        Category::Folder => console::render_folder_contents(out, &list_children(path)?),
        Category::Image if suffix == ".gif" => Err(unavailable("animated images")),
        Category::Image => previewer.show_image(path, out),
        Category::Audio => previewer.play_audio(path),
        Category::Video => previewer.sample_video_frames(path, settings.video_frames, out),
        Category::Document => match document_preview(&suffix) {
            Some(DocumentPreview::Table) => {
                let rows = previewer.render_table(path, settings.table_rows)?;
                console::render_table(out, &rows)
            }
            Some(DocumentPreview::Text) => {
                let text = previewer.extract_text(path, settings.text_chars)?;
                console::render_excerpt(out, &text)
            }
            Some(DocumentPreview::FirstPage) => {
                let text = previewer.extract_first_page_text(path, settings.text_chars)?;
                console::render_excerpt(out, &text)
            }
            None => Err(unavailable("document format")),
        },
        Category::Archive | Category::Unrecognized => Err(unavailable("entry type")),
    }
}

/// Drives one entry from the first prompt to a terminal state.
pub struct TriageMachine<'a, R, W> {
    pub staging: &'a StagingDirs,
    pub settings: &'a PreviewSettings,
    pub previewer: &'a mut dyn Previewer,
    pub opener: &'a mut dyn Opener,
    pub input: &'a mut R,
    pub out: &'a mut W,
}

impl<R: BufRead, W: Write> TriageMachine<'_, R, W> {
    /// Prompts until a terminal command. At most one move happens; a failed
    /// move is returned as an error and leaves the entry in place.
    pub fn run(&mut self, summary: &EntrySummary) -> Result<TriageOutcome> {
        let mut state = TriageState::Prompting;

        loop {
            self.previewer.stop_audio();

            let line = console::prompt_action(&mut *self.input, &mut *self.out)?;
            let command = console::parse_command(&line);
            let (next, effect) = transition(state, command);
            debug!(entry = %summary.name, ?state, ?command, ?next, "triage transition");

            match effect {
                Effect::Move(destination) => {
                    let moved = self.staging.move_into(&summary.path, destination)?;
                    return Ok(match destination {
                        Destination::Kept => TriageOutcome::Kept(moved),
                        Destination::Deleted => TriageOutcome::Deleted(moved),
                    });
                }
                Effect::Open => {
                    if let Err(e) = self.opener.open(&summary.path) {
                        warn!(entry = %summary.name, error = %e, "open failed");
                        console::render_warning(&mut *self.out, &e.to_string())?;
                    }
                }
                Effect::Preview => self.preview(summary)?,
                Effect::None => {}
            }

            if next.is_terminal() {
                self.previewer.stop_audio();
                return Ok(TriageOutcome::Skipped);
            }
            state = transition(next, command).0;
        }
    }

    fn preview(&mut self, summary: &EntrySummary) -> Result<()> {
        let result = preview_entry(summary, &mut *self.previewer, self.settings, &mut *self.out);
        if let Err(e) = result {
            debug!(entry = %summary.name, error = %e, "preview failed");
            console::render_no_preview(&mut *self.out)?;
        }
        Ok(())
    }
}
