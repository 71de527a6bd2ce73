//! Terminal interaction for note commands
//!
//! `edit_note_content` hands a draft to an external editor, and
//! `confirm_delete` backs the notepad's delete guard with a y/N prompt.

use std::io::{self, BufRead, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use jotpad_core::Note;

/// Editors tried, in order, when neither $EDITOR nor $VISUAL is set
const FALLBACK_EDITORS: [&str; 4] = ["nano", "vim", "vi", "notepad"];

/// Let the user write note content in their editor
///
/// The draft lives in a `.md` temp file that is removed afterwards, even if
/// the editor fails.
pub fn edit_note_content(initial: &str) -> Result<String> {
    let editor = pick_editor(|var| std::env::var(var).ok(), on_path)
        .context("No editor found. Set $EDITOR, for example: export EDITOR=nano")?;

    let mut draft = tempfile::Builder::new()
        .prefix("jotpad-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create a draft file")?;
    draft
        .write_all(initial.as_bytes())
        .and_then(|_| draft.flush())
        .context("Failed to write the draft file")?;

    debug!("Opening {:?} in {}", draft.path(), editor);
    let status = Command::new(&editor)
        .arg(draft.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;
    if !status.success() {
        bail!("{} exited with {}; note left unchanged", editor, status);
    }

    std::fs::read_to_string(draft.path()).context("Failed to read the edited draft")
}

/// First usable editor from the environment or the fallback list
fn pick_editor(
    env: impl Fn(&str) -> Option<String>,
    exists: impl Fn(&str) -> bool,
) -> Option<String> {
    ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(&env)
        .find(|editor| !editor.trim().is_empty())
        .or_else(|| {
            FALLBACK_EDITORS
                .into_iter()
                .find(|&editor| exists(editor))
                .map(str::to_string)
        })
}

fn on_path(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Ask before deleting a note
///
/// Without a terminal on stdin there is nobody to ask, so the answer is no.
pub fn confirm_delete(note: &Note) -> bool {
    if !atty::is(atty::Stream::Stdin) {
        return false;
    }

    eprint!("Delete '{}'? This cannot be undone. [y/N] ", note.title);
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => accepts(&answer),
        Err(e) => {
            debug!("Could not read delete confirmation: {}", e);
            false
        }
    }
}

fn accepts(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_editor_prefers_editor_variable() {
        let env = |var: &str| match var {
            "EDITOR" => Some("hx".to_string()),
            "VISUAL" => Some("code -w".to_string()),
            _ => None,
        };
        assert_eq!(pick_editor(env, |_| true), Some("hx".to_string()));
    }

    #[test]
    fn test_pick_editor_skips_blank_variables() {
        let env = |var: &str| match var {
            "EDITOR" => Some("  ".to_string()),
            "VISUAL" => Some("emacs".to_string()),
            _ => None,
        };
        assert_eq!(pick_editor(env, |_| false), Some("emacs".to_string()));
    }

    #[test]
    fn test_pick_editor_falls_back_to_installed() {
        assert_eq!(
            pick_editor(|_| None, |cmd| cmd == "vi"),
            Some("vi".to_string())
        );
        assert_eq!(pick_editor(|_| None, |_| false), None);
    }

    #[test]
    fn test_accepts() {
        assert!(accepts("y\n"));
        assert!(accepts(" YES "));
        assert!(!accepts("n"));
        assert!(!accepts("yeah"));
        assert!(!accepts(""));
    }
}
