//! Broom - an interactive directory triage library
//!
//! Walks the entries of a working directory, classifies and sizes each one,
//! and lets an operator move it to `_to_be_kept`, `_to_be_deleted`, or leave
//! it in place, with optional previews along the way.

pub mod cli;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod file_opener;
pub mod logging;
pub mod preview;
pub mod session;

// Re-export primary types for convenience
pub use config::{PreviewSettings, UserConfig};
pub use domain::{
    format_size, inspect, Category, Command, EntrySummary, ExtensionTable, FolderStats,
    StagingDirs, TriageMachine, TriageOutcome, TriageState,
};
pub use error::{BroomError, Result};
pub use file_opener::{open_file, Opener, SystemOpener};
pub use preview::{Previewer, TerminalPreviewer};
pub use session::{BroomSession, SessionReport};
