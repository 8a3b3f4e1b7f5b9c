//! Interactive message editing
//!
//! The editor command comes from `REWORD_EDITOR`, then `VISUAL`, then
//! `EDITOR`, falling back to `vi`. It runs through `sh -c` so values such as
//! `code --wait` work.

use std::io::Write;
use std::process::Command;

const EDITOR_VARS: [&str; 3] = ["REWORD_EDITOR", "VISUAL", "EDITOR"];
const DEFAULT_EDITOR: &str = "vi";

const INSTRUCTIONS: &str = "\
# Enter the new message for this snapshot. Lines starting
# with '#' are ignored; an empty message aborts the reword.
";

fn editor_command() -> String {
    EDITOR_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
}

/// Drop comment lines and surrounding blank lines
pub fn strip_comments(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim_end)
        .collect();
    kept.join("\n").trim().to_string()
}

/// Let the user edit `initial` and return the cleaned result
///
/// # Errors
///
/// Fails if the editor cannot be started, exits unsuccessfully, or leaves an
/// empty message.
pub fn edit_message(initial: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut file = tempfile::Builder::new()
        .prefix("REWORD_MSG_")
        .suffix(".txt")
        .tempfile()?;
    writeln!(file, "{}", initial.trim_end())?;
    writeln!(file)?;
    file.write_all(INSTRUCTIONS.as_bytes())?;
    file.flush()?;

    let editor = editor_command();
    tracing::debug!(editor = %editor, path = %file.path().display(), "Launching editor");
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(&editor)
        .arg(file.path())
        .status()?;
    if !status.success() {
        return Err(format!("editor '{}' exited with {}", editor, status).into());
    }

    let message = strip_comments(&std::fs::read_to_string(file.path())?);
    if message.is_empty() {
        return Err("Aborting reword due to empty message".into());
    }
    Ok(message)
}
