//! Annotated argument lists and subprocess execution.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::{Error, Result};

/// An argument list with human-readable annotations.
///
/// Encoder invocations here run to dozens of arguments; notes group the
/// arguments after them so the debug log stays readable. `Display` prints
/// one annotated group per line, shell quoted for copy-pasting; the notes
/// never reach the child process.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    items: Vec<Item>,
}

#[derive(Debug, Clone)]
enum Item {
    Note(String),
    Arg(String),
}

impl ArgList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Annotate the arguments that follow.
    pub fn note(&mut self, note: impl Into<String>) {
        self.items.push(Item::Note(note.into()));
    }

    /// Append one argument.
    pub fn arg(&mut self, arg: impl ToString) {
        self.items.push(Item::Arg(arg.to_string()));
    }

    /// Append several arguments.
    pub fn args<I, T>(&mut self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        for arg in args {
            self.arg(arg);
        }
    }

    /// Append another list, keeping its annotations.
    pub fn extend(&mut self, other: ArgList) {
        self.items.extend(other.items);
    }

    /// The bare arguments, in order, without annotations.
    pub fn to_argv(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                Item::Arg(arg) => Some(arg.as_str()),
                Item::Note(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for ArgList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = String::new();
        for item in &self.items {
            match item {
                Item::Note(note) => {
                    if !line.is_empty() {
                        writeln!(f, "{line}")?;
                        line.clear();
                    }
                    writeln!(f, "# {note}")?;
                }
                Item::Arg(arg) => {
                    if !line.is_empty() {
                        line.push(' ');
                    }
                    line.push_str(&shell_quote(arg));
                }
            }
        }
        if !line.is_empty() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "+-_.,:/=%@".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Run `program` with `args`, capturing its output.
///
/// Returns the captured stdout on success. When `cwd` is given the child
/// runs inside that directory.
///
/// # Errors
///
/// A missing executable maps to [`Error::ToolNotFound`]; a non-zero exit
/// status maps to [`Error::ToolFailed`] carrying the captured stderr.
pub fn run_tool(program: &Path, args: &ArgList, cwd: Option<&Path>) -> Result<String> {
    debug!("running {}:\n{args}", program.display());

    let mut command = Command::new(program);
    command.args(args.to_argv());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::tool_not_found(program.display().to_string()),
        _ => Error::from(e),
    })?;
    if !output.status.success() {
        return Err(Error::tool_failed(
            program.display().to_string(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_argv_skips_notes() {
        let mut args = ArgList::new();
        args.note("input");
        args.args(["-i", "in.mp4"]);
        args.note("rate");
        args.arg("-b:v");
        args.arg(format!("{}k", 2500));

        assert_eq!(args.to_argv(), vec!["-i", "in.mp4", "-b:v", "2500k"]);
    }

    #[test]
    fn test_display_groups_by_note() {
        let mut args = ArgList::new();
        args.note("input");
        args.args(["-i", "some file.mp4"]);
        args.note("flags");
        args.arg("-hide_banner");

        assert_eq!(
            args.to_string(),
            "# input\n-i 'some file.mp4'\n# flags\n-hide_banner\n"
        );
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut audio = ArgList::new();
        audio.note("audio");
        audio.args(["-c:a", "aac"]);

        let mut all = ArgList::new();
        all.arg("-i");
        all.extend(audio);

        assert_eq!(all.to_argv(), vec!["-i", "-c:a", "aac"]);
        assert!(all.to_string().contains("# audio"));
    }

    #[test]
    fn test_run_captures_stdout() {
        let mut args = ArgList::new();
        args.args(["-c", "printf hello"]);

        let out = run_tool(Path::new("sh"), &args, None).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_run_missing_program() {
        let args = ArgList::new();
        assert_matches!(
            run_tool(Path::new("/nonexistent/tool_12345"), &args, None),
            Err(Error::ToolNotFound { .. })
        );
    }

    #[test]
    fn test_run_failure_carries_stderr() {
        let mut args = ArgList::new();
        args.args(["-c", "echo boom >&2; exit 3"]);

        let err = run_tool(Path::new("sh"), &args, None).unwrap_err();
        assert_matches!(err, Error::ToolFailed { ref message, .. } if message.contains("boom"));
    }

    #[test]
    fn test_run_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = ArgList::new();
        args.args(["-c", "pwd"]);

        let out = run_tool(Path::new("sh"), &args, Some(dir.path())).unwrap();
        assert_eq!(
            Path::new(out.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
