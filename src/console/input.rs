use crate::domain::Command;

/// Maps one line typed at the triage prompt to a command.
///
/// Matching is exact and case-sensitive; anything unrecognised, including
/// an empty line, skips the entry.
pub fn parse_command(line: &str) -> Command {
    match line.trim() {
        "d" | "delete" => Command::Delete,
        "k" | "keep" => Command::Keep,
        "o" | "open" => Command::Open,
        "l" | "look" | "p" | "preview" => Command::Preview,
        _ => Command::Skip,
    }
}

/// Maps the answer to a yes/no question. Only `y`/`Y` is a yes.
pub fn parse_confirm(line: &str) -> bool {
    matches!(line.trim(), "y" | "Y")
}
