//! Capture intake
//!
//! Turns a piece of selected text into a note at the front of the
//! collection, without opening the editor.

use tracing::{info, warn};

use crate::clock::Clock;
use crate::models::{truncate_chars, Note, NoteId};
use crate::notify::Notifier;
use crate::repository::NoteRepository;
use crate::storage::StorageArea;

/// Longest title taken from a selection before it is shortened
pub const CAPTURE_TITLE_LIMIT: usize = 50;

/// Title of the confirmation shown after a capture
pub const CAPTURE_NOTICE_TITLE: &str = "Jotpad";

/// Message of the confirmation shown after a capture
pub const CAPTURE_NOTICE_MESSAGE: &str = "Selected text was added to your notes.";

/// Title derived from captured text
pub fn capture_title(text: &str) -> String {
    truncate_chars(text, CAPTURE_TITLE_LIMIT)
}

/// Build the note for a selection; `None` for empty text
pub fn note_from_selection(text: &str, clock: &dyn Clock) -> Option<Note> {
    if text.trim().is_empty() {
        return None;
    }
    Some(Note::new(capture_title(text), text, clock.now()))
}

/// Add selected text as a new note and confirm on success
///
/// Returns the new note's ID, or `None` when there was nothing to capture.
/// The confirmation is only sent once the collection has been written.
pub async fn capture_selection<S: StorageArea>(
    repo: &mut NoteRepository<S>,
    clock: &dyn Clock,
    notifier: &dyn Notifier,
    selection: Option<&str>,
) -> Option<NoteId> {
    let note = note_from_selection(selection.unwrap_or_default(), clock)?;
    let id = note.id.clone();

    if repo.upsert(note).await.is_persisted() {
        info!("Captured selection as note {}", id);
        notifier.notify(CAPTURE_NOTICE_TITLE, CAPTURE_NOTICE_MESSAGE);
    } else {
        warn!("Captured note {} could not be saved", id);
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::ELLIPSIS;
    use crate::storage::{MemoryStorage, PersistentStore};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String)>>);

    impl Notifier for Recorder {
        fn notify(&self, title: &str, message: &str) {
            self.0
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.0.lock().unwrap().len()
        }
    }

    fn repo() -> (NoteRepository<MemoryStorage>, MemoryStorage) {
        let area = MemoryStorage::new();
        (NoteRepository::new(PersistentStore::new(area.clone())), area)
    }

    #[test]
    fn test_capture_title() {
        assert_eq!(capture_title("short text"), "short text");

        let exact = "a".repeat(CAPTURE_TITLE_LIMIT);
        assert_eq!(capture_title(&exact), exact);

        let long = "b".repeat(CAPTURE_TITLE_LIMIT + 1);
        assert_eq!(
            capture_title(&long),
            format!("{}{}", "b".repeat(CAPTURE_TITLE_LIMIT), ELLIPSIS)
        );
    }

    #[tokio::test]
    async fn test_long_selection_becomes_front_note() {
        let (mut repo, _) = repo();
        let clock = ManualClock::at_millis(1234);
        let notifier = Recorder::default();
        let text: String = ('a'..='z').cycle().take(80).collect();

        let id = capture_selection(&mut repo, &clock, &notifier, Some(&text))
            .await
            .unwrap();

        assert_eq!(repo.position(&id), Some(0));
        let note = repo.find(&id).unwrap();
        assert_eq!(note.title, format!("{}...", &text[..50]));
        assert_eq!(note.content, text);
        assert_eq!(note.created_at.timestamp_millis(), 1234);
        assert_eq!(note.updated_at, note.created_at);

        let sent = notifier.0.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                CAPTURE_NOTICE_TITLE.to_string(),
                CAPTURE_NOTICE_MESSAGE.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_capture_prepends_to_existing_notes() {
        let (mut repo, _) = repo();
        let clock = ManualClock::at_millis(0);
        let notifier = Recorder::default();

        let first = capture_selection(&mut repo, &clock, &notifier, Some("one"))
            .await
            .unwrap();
        let second = capture_selection(&mut repo, &clock, &notifier, Some("two"))
            .await
            .unwrap();

        assert_eq!(repo.position(&second), Some(0));
        assert_eq!(repo.position(&first), Some(1));
        assert_eq!(notifier.count(), 2);
    }

    #[tokio::test]
    async fn test_empty_or_absent_selection_is_ignored() {
        let (mut repo, area) = repo();
        let clock = ManualClock::at_millis(0);
        let notifier = Recorder::default();

        assert!(capture_selection(&mut repo, &clock, &notifier, None).await.is_none());
        assert!(capture_selection(&mut repo, &clock, &notifier, Some("")).await.is_none());

        assert!(repo.is_empty());
        assert_eq!(area.write_count(), 0);
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_failed_write_sends_no_confirmation() {
        let (mut repo, area) = repo();
        area.fail_writes(true);
        let clock = ManualClock::at_millis(0);
        let notifier = Recorder::default();

        let id = capture_selection(&mut repo, &clock, &notifier, Some("kept in memory"))
            .await
            .unwrap();

        assert!(repo.find(&id).is_some());
        assert_eq!(notifier.count(), 0);
    }
}
