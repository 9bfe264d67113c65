//! Line-oriented command language for driving a form session.

use anyhow::{bail, Result};

/// One parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// User edit of a single field; `value` is parsed by the field's kind.
    Set { field: String, value: String },
    Undo,
    Redo,
    /// Print the current form value.
    Show,
    /// Print undo/redo depths.
    History,
    Submit,
    /// Discard all history.
    Clear,
}

/// Parses one script line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
///
/// # Errors
///
/// Returns an error for unknown commands or missing arguments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim_start()),
                None => (rest, ""),
            };
            if field.is_empty() {
                bail!("usage: set <field> <value>");
            }
            Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "undo" => no_args(Command::Undo, rest)?,
        "redo" => no_args(Command::Redo, rest)?,
        "show" => no_args(Command::Show, rest)?,
        "history" => no_args(Command::History, rest)?,
        "submit" => no_args(Command::Submit, rest)?,
        "clear" => no_args(Command::Clear, rest)?,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn no_args(command: Command, rest: &str) -> Result<Command> {
    if !rest.is_empty() {
        bail!("{command:?} takes no arguments");
    }
    Ok(command)
}
