//! Executes command scripts against a form session.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use formhist_history::{FormSession, RecordingSink};

use crate::script::{parse_line, Command};

/// Counts reported once a script has run to the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub errors: usize,
}

/// Runs every line of `input`, writing results and notifications to `out`.
///
/// Bad lines are reported with their line number and skipped.
///
/// # Errors
///
/// Returns an error only if reading `input` or writing `out` fails.
pub fn run<R: BufRead, W: Write>(
    session: &mut FormSession<RecordingSink>,
    input: R,
    out: &mut W,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read script line")?;
        let line_no = index + 1;

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                summary.errors += 1;
                writeln!(out, "line {line_no}: {e:#}")?;
                continue;
            }
        };

        summary.commands += 1;
        if let Err(e) = execute(session, &command, out) {
            summary.errors += 1;
            tracing::debug!(line_no, ?command, "Command failed: {e:#}");
            writeln!(out, "line {line_no}: {e:#}")?;
        }

        for notification in session.sink_mut().drain() {
            writeln!(out, "{notification}")?;
        }
    }

    out.flush()?;
    Ok(summary)
}

fn execute<W: Write>(
    session: &mut FormSession<RecordingSink>,
    command: &Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Set { field, value } => session.edit_from_str(field, value)?,
        Command::Undo => {
            session.undo();
        }
        Command::Redo => {
            session.redo();
        }
        Command::Show => writeln!(out, "{}", session.value())?,
        Command::History => {
            let history = session.history();
            writeln!(
                out,
                "undo: {}, redo: {}",
                history.undo_depth(),
                history.redo_depth()
            )?;
        }
        Command::Submit => writeln!(out, "submitted {}", session.submit())?,
        Command::Clear => session.clear_history(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formhist_history::{FieldSpec, Form, FormSchema, HistoryConfig};

    fn session(config: HistoryConfig) -> FormSession<RecordingSink> {
        let schema = FormSchema::new(vec![
            FieldSpec::text("name"),
            FieldSpec::text("age"),
            FieldSpec::text("email"),
        ])
        .unwrap();
        FormSession::new(Form::new(schema), config, RecordingSink::new())
    }

    fn run_script(config: HistoryConfig, script: &str) -> (String, RunSummary) {
        let mut s = session(config);
        let mut out = Vec::new();
        let summary = run(&mut s, script.as_bytes(), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn test_walkthrough_output() {
        let script = "\
set name Jo
set age 30
history
undo
show
undo
show
redo
history
";
        let (out, summary) = run_script(HistoryConfig::default(), script);
        let expected = "\
undo: 2, redo: 0
[Undo] Last change has been reverted.
{age: \"\", email: \"\", name: \"Jo\"}
[Undo] Last change has been reverted.
{age: \"\", email: \"\", name: \"\"}
[Redo] Redo change has been recovered.
undo: 1, redo: 1
";
        assert_eq!(out, expected);
        assert_eq!(summary, RunSummary { commands: 9, errors: 0 });
    }

    #[test]
    fn test_empty_undo_is_silent() {
        let (out, summary) = run_script(HistoryConfig::default(), "undo\nredo\n");
        assert_eq!(out, "");
        assert_eq!(summary.errors, 0);
    }

    #[test]
    fn test_empty_undo_reported_when_configured() {
        let config = HistoryConfig {
            notify_on_empty: true,
            ..HistoryConfig::default()
        };
        let (out, _) = run_script(config, "undo\n");
        assert_eq!(out, "[Undo] Nothing to undo.\n");
    }

    #[test]
    fn test_errors_are_reported_and_skipped() {
        let script = "# comment\nfrobnicate\nset phone 123\nset name Jo\nhistory\n";
        let (out, summary) = run_script(HistoryConfig::default(), script);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("line 2: unknown command"));
        assert!(lines[1].starts_with("line 3: unknown field 'phone'"));
        assert_eq!(lines[2], "undo: 1, redo: 0");
        assert_eq!(summary, RunSummary { commands: 3, errors: 2 });
    }

    #[test]
    fn test_clear_and_submit() {
        let (out, _) = run_script(
            HistoryConfig::default(),
            "set name Jo\nclear\nhistory\nsubmit\n",
        );
        assert_eq!(
            out,
            "undo: 0, redo: 0\nsubmitted {age: \"\", email: \"\", name: \"Jo\"}\n"
        );
    }
}
