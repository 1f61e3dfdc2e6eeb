// Console rendering and prompting for the interactive session
pub mod input;

use crate::domain::{format_size, EntrySummary, FolderStats, TriageOutcome};
use crate::error::Result;
use crate::session::SessionReport;
use crossterm::style::Stylize;
use std::io::{BufRead, Write};

pub use input::{parse_command, parse_confirm};

const INDENT: &str = "           ";

/// Reads one line, or an empty string at end of input. Bytes that are not
/// UTF-8 are replaced, so they read as an unrecognized answer.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut buffer = Vec::new();
    input.read_until(b'\n', &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer)
        .trim_end_matches(['\r', '\n'])
        .to_string())
}

/// Asks for a triage action and returns the raw answer.
pub fn prompt_action<R: BufRead, W: Write + ?Sized>(input: &mut R, out: &mut W) -> Result<String> {
    write!(
        out,
        "❔ {}    ",
        "Delete, Look, Open, Keep, or Enter to skip :".blue()
    )?;
    out.flush()?;
    read_line(input)
}

/// Asks a yes/no question; only `y` counts as yes.
pub fn confirm<R: BufRead, W: Write + ?Sized>(
    input: &mut R,
    out: &mut W,
    question: &str,
) -> Result<bool> {
    write!(out, "{}{} y/n  ", INDENT, question)?;
    out.flush()?;
    Ok(parse_confirm(&read_line(input)?))
}

pub fn render_banner<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    writeln!(out, "--- Starting brooming ---")?;
    Ok(())
}

pub fn render_stats<W: Write + ?Sized>(out: &mut W, stats: &FolderStats) -> Result<()> {
    let total = stats.total_bytes();
    writeln!(out, "\n{}", "Folder overview".bold())?;
    for entry in stats.ranked() {
        writeln!(
            out,
            "   {} {:<10} {:>5.1} %  {:>10}  ({})",
            entry.category.icon(),
            entry.category.label(),
            entry.percentage(total),
            format_size(entry.total_size),
            entry.entry_count
        )?;
    }
    writeln!(out, "   total {}", format_size(total))?;
    Ok(())
}

pub fn render_entry<W: Write + ?Sized>(out: &mut W, summary: &EntrySummary) -> Result<()> {
    writeln!(
        out,
        "\n{} -  {} ~ {} ({})",
        summary.category.icon(),
        summary.name.as_str().yellow().bold(),
        summary.formatted_size,
        summary.modified_date.format("%Y-%m-%d")
    )?;
    Ok(())
}

pub fn render_outcome<W: Write + ?Sized>(out: &mut W, outcome: &TriageOutcome) -> Result<()> {
    match outcome {
        TriageOutcome::Kept(_) => writeln!(out, "     {}", "kept".green())?,
        TriageOutcome::Deleted(_) => writeln!(out, "     {}", "set aside for deletion".red())?,
        TriageOutcome::Skipped => writeln!(out, "     {}", "skipped".dark_grey())?,
    }
    Ok(())
}

pub fn render_folder_contents<W: Write + ?Sized>(out: &mut W, names: &[String]) -> Result<()> {
    writeln!(out, "     folder contents: {}", names.join(", "))?;
    Ok(())
}

/// Pads every cell to its column's widest value.
pub fn align_columns(rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn render_table<W: Write + ?Sized>(out: &mut W, rows: &[Vec<String>]) -> Result<()> {
    for line in align_columns(rows) {
        writeln!(out, "     {}", line)?;
    }
    writeln!(out, "     [...]")?;
    Ok(())
}

/// Collapses runs of blank lines into a single line break.
pub fn collapse_blank_lines(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut previous_blank = false;
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        if !collapsed.is_empty() {
            collapsed.push('\n');
        }
        if !blank {
            collapsed.push_str(line);
        }
        previous_blank = blank;
    }
    collapsed
}

pub fn render_excerpt<W: Write + ?Sized>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{} [...]", collapse_blank_lines(text).trim_end())?;
    Ok(())
}

pub fn render_no_preview<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    writeln!(out, "     No preview available...")?;
    Ok(())
}

pub fn render_warning<W: Write + ?Sized>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "     {} {}", "⚠".yellow(), message)?;
    Ok(())
}

pub fn render_tally<W: Write + ?Sized>(out: &mut W, report: &SessionReport) -> Result<()> {
    writeln!(
        out,
        "\n{}{} kept, {} set aside, {} skipped, {} failed",
        INDENT, report.kept, report.deleted, report.skipped, report.failed
    )?;
    Ok(())
}

pub fn render_pending_deletion<W: Write + ?Sized>(out: &mut W, bytes: u64) -> Result<()> {
    writeln!(out, "{}{} waiting in _to_be_deleted", INDENT, format_size(bytes))?;
    Ok(())
}

pub fn render_broomed<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    writeln!(out, "\n{}🧹 FOLDER HAS BEEN BROOMED 🧹", INDENT)?;
    Ok(())
}

pub fn render_purged<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    writeln!(out, "\n{}🧹 BROOMED FILES WERE DELETED 🧹", INDENT)?;
    Ok(())
}
