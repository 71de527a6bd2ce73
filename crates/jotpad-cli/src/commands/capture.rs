//! Capture command handler

use std::io::Read;

use anyhow::{Context, Result};

use jotpad_core::{Command, Outcome};

use super::Pad;

/// Add selected text as a new note
///
/// Reads stdin when no text is given. The confirmation comes from the
/// notepad's notifier.
pub async fn capture(pad: &mut Pad, text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read selection from stdin")?;
            strip_line_ending(buf)
        }
    };

    match pad.dispatch(Command::Capture(text)).await {
        Outcome::Captured(id) => {
            tracing::debug!("Captured selection as {}", id);
            Ok(())
        }
        _ => {
            anyhow::bail!("Nothing captured: the selection was empty or could not be saved")
        }
    }
}

/// Drop the single line terminator that piping text adds
fn strip_line_ending(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use jotpad_core::{FileStorage, Notepad, NotepadOptions};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_capture_prepends_note() {
        let temp_dir = TempDir::new().unwrap();
        let mut pad = Notepad::new(
            FileStorage::new(temp_dir.path().join("storage.json")),
            NotepadOptions::default(),
        )
        .with_notifier(std::sync::Arc::new(|_: &str, _: &str| {}));
        pad.load().await;

        capture(&mut pad, Some("clipped from a page".into()))
            .await
            .unwrap();

        assert_eq!(pad.notes()[0].content, "clipped from a page");
        assert_eq!(pad.notes()[0].title, "clipped from a page");
    }

    #[tokio::test]
    async fn test_blank_capture_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut pad = Notepad::new(
            FileStorage::new(temp_dir.path().join("storage.json")),
            NotepadOptions::default(),
        );
        pad.load().await;

        assert!(capture(&mut pad, Some(String::new())).await.is_err());
    }

    #[test]
    fn test_strip_line_ending() {
        assert_eq!(strip_line_ending("selected\n".into()), "selected");
        assert_eq!(strip_line_ending("selected\r\n".into()), "selected");
        assert_eq!(strip_line_ending("two\n\n".into()), "two\n");
        assert_eq!(strip_line_ending("as is".into()), "as is");
    }
}
