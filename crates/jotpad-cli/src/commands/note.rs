//! Note command handlers

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use jotpad_core::{Command, Draft, NoteId, Outcome, SaveOutcome, WriteOutcome};

use super::Pad;
use crate::editor::edit_note_content;
use crate::output::{short_id, Output};

/// List notes, optionally filtered by a search query
pub async fn list(pad: &mut Pad, search: Option<String>, output: &Output) -> Result<()> {
    if let Some(query) = search {
        pad.dispatch(Command::Search(query)).await;
    }
    output.print_notes(&pad.snapshot().notes);
    Ok(())
}

/// Show a single note
pub fn show(pad: &Pad, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(pad, &id)?;
    let note = pad
        .find(&id)
        .ok_or_else(|| anyhow::anyhow!("Note not found: {}", id))?;
    output.print_note(note);
    Ok(())
}

/// Create a new note
///
/// Opens the editor for the content when none is given.
pub async fn create(
    pad: &mut Pad,
    title: Option<String>,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let content = match content {
        Some(c) => c,
        None => edit_note_content("").context("Failed to edit note")?,
    };

    pad.dispatch(Command::StartNew).await;
    pad.dispatch(Command::UpdateDraft(Draft::new(
        title.unwrap_or_default(),
        content,
    )))
    .await;

    let outcome = pad.dispatch(Command::Save).await;
    report_save(pad, outcome, "Created", output)
}

/// Edit an existing note
///
/// Fields not given keep their current value; with neither given the
/// content opens in the editor.
pub async fn edit(
    pad: &mut Pad,
    id: String,
    title: Option<String>,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(pad, &id)?;
    let Outcome::Editing(_) = pad.dispatch(Command::StartEdit(id.clone())).await else {
        bail!("Note not found: {}", id);
    };

    let current = pad
        .session()
        .draft()
        .cloned()
        .unwrap_or_default();

    let draft = match (title, content) {
        (None, None) => {
            let edited = edit_note_content(&current.content).context("Failed to edit note")?;
            Draft::new(current.title, edited)
        }
        (title, content) => Draft::new(
            title.unwrap_or(current.title),
            content.unwrap_or(current.content),
        ),
    };
    pad.dispatch(Command::UpdateDraft(draft)).await;

    match pad.dispatch(Command::Save).await {
        Outcome::Saved(SaveOutcome::Discarded) => {
            output.message("Edit discarded: title and content were empty. Note unchanged.");
            Ok(())
        }
        outcome => report_save(pad, outcome, "Updated", output),
    }
}

/// Delete a note
///
/// Confirmation is handled by the notepad's delete guard.
pub async fn delete(pad: &mut Pad, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(pad, &id)?;

    match pad.dispatch(Command::Delete(id.clone())).await {
        Outcome::Deleted(WriteOutcome::Persisted) => {
            output.success(&format!("Deleted note: {}", id));
            Ok(())
        }
        Outcome::Deleted(WriteOutcome::Unchanged) => bail!("Note not found: {}", id),
        Outcome::Deleted(WriteOutcome::Unsaved) => {
            bail!(
                "Note {} was removed but the change could not be saved: {}",
                id,
                write_failure(pad)
            )
        }
        _ => {
            output.message("Cancelled.");
            Ok(())
        }
    }
}

/// Write a note line by line from stdin
///
/// Each line updates the draft and restarts the autosave timer. After an
/// autosave the note is reopened so writing can continue. End of input
/// saves whatever remains.
pub async fn compose(pad: &mut Pad, title: Option<String>, output: &Output) -> Result<()> {
    let Outcome::Editing(mut id) = pad.dispatch(Command::StartNew).await else {
        bail!("Could not start a new note");
    };

    let mut draft = Draft::new(title.unwrap_or_default(), "");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if output.should_prompt() {
        eprintln!("Type your note. Press Ctrl-D to finish.");
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if !draft.content.is_empty() {
                    draft.content.push('\n');
                }
                draft.content.push_str(&line);
                pad.dispatch(Command::UpdateDraft(draft.clone())).await;
            }
            Some(due) = pad.next_autosave() => {
                if let Some(SaveOutcome::Saved { id: saved, write }) = pad.apply_autosave(due).await {
                    if write == WriteOutcome::Unsaved {
                        eprintln!(
                            "⚠ Autosave failed, keeping the draft in memory: {}",
                            write_failure(pad)
                        );
                    } else {
                        tracing::debug!("Autosaved {}", saved);
                    }
                    id = saved;
                }
                if !pad.session().is_editing() {
                    id = resume(pad, id).await;
                }
            }
        }
    }

    if !pad.session().is_editing() {
        resume(pad, id).await;
    }
    pad.dispatch(Command::UpdateDraft(draft)).await;
    let outcome = pad.dispatch(Command::Save).await;
    report_save(pad, outcome, "Saved", output)
}

/// Reopen a note after an autosave ended the session
///
/// Starts a fresh note when the autosave discarded an empty draft.
async fn resume(pad: &mut Pad, id: NoteId) -> NoteId {
    match pad.dispatch(Command::StartEdit(id.clone())).await {
        Outcome::Editing(id) => id,
        _ => match pad.dispatch(Command::StartNew).await {
            Outcome::Editing(new_id) => new_id,
            _ => id,
        },
    }
}

/// Turn a save outcome into output or an error
fn report_save(pad: &Pad, outcome: Outcome, verb: &str, output: &Output) -> Result<()> {
    match outcome {
        Outcome::Saved(SaveOutcome::Saved {
            id,
            write: WriteOutcome::Persisted,
        }) => {
            output.success(&format!("{} note {}", verb, id));
            Ok(())
        }
        Outcome::Saved(SaveOutcome::Saved { id, .. }) => {
            bail!(
                "Note {} could not be written to storage: {}",
                id,
                write_failure(pad)
            )
        }
        Outcome::Saved(SaveOutcome::Discarded) => {
            output.message("Nothing to save: title and content are empty.");
            Ok(())
        }
        other => bail!("Unexpected result while saving: {:?}", other),
    }
}

/// Cause of the most recent failed write, with a hint when one exists
fn write_failure(pad: &Pad) -> String {
    pad.repository()
        .last_write_error()
        .map(|e| e.describe())
        .unwrap_or_else(|| "unknown storage error".to_string())
}

/// Resolve a note ID (supports full ID or unique prefix)
pub fn resolve_id(pad: &Pad, id: &str) -> Result<NoteId> {
    let exact = NoteId::from(id);
    if pad.find(&exact).is_some() {
        return Ok(exact);
    }

    let matches: Vec<_> = pad
        .notes()
        .iter()
        .filter(|n| n.id.as_str().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No note found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple notes match '{}':", id);
            for note in &matches {
                eprintln!("  {} - {}", short_id(note), note.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
