//! Note repository
//!
//! The in-memory note collection, mirrored to storage after every change.
//!
//! Storage failures never reach the caller. Reads degrade to an empty
//! collection and writes leave the in-memory state as it was, so the user can
//! keep working; each failure is logged and reported through `WriteOutcome`.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::models::{Note, NoteId};
use crate::storage::{PersistentStore, StorageArea, StorageError};

/// ID of the note written on first run
pub const WELCOME_NOTE_ID: &str = "welcome";

const WELCOME_TITLE: &str = "Welcome! 👋";

const WELCOME_CONTENT: &str = "Welcome to Jotpad!\n\n\
Write and organize quick notes without leaving what you are doing.\n\n\
Features:\n\
• Create new notes\n\
• Edit and delete notes\n\
• Search notes\n\
• Autosave while you type\n\n\
You can delete this note at any time.";

/// Result of mirroring a change to storage
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The collection was written
    Persisted,
    /// Nothing changed, so nothing was written
    Unchanged,
    /// The write failed; the change exists in memory only
    Unsaved,
}

impl WriteOutcome {
    pub fn is_persisted(self) -> bool {
        self == WriteOutcome::Persisted
    }
}

/// Ordered note collection backed by a storage area
pub struct NoteRepository<S> {
    store: PersistentStore<S>,
    notes: Vec<Note>,
    last_write_error: Option<StorageError>,
}

impl<S: StorageArea> NoteRepository<S> {
    /// Create an empty repository; call `load()` to read stored notes
    pub fn new(store: PersistentStore<S>) -> Self {
        Self {
            store,
            notes: Vec::new(),
            last_write_error: None,
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    /// Replace the in-memory collection with the stored one
    ///
    /// Missing or unreadable data yields an empty collection.
    pub async fn load(&mut self) {
        self.notes = match self.store.load_notes().await {
            Ok(Some(notes)) => dedupe(notes),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load notes, starting empty: {}", e.describe());
                Vec::new()
            }
        };
        debug!("Loaded {} note(s)", self.notes.len());
    }

    /// Write the welcome note if no collection has ever been stored
    ///
    /// Returns true if the welcome note was written.
    pub async fn seed_welcome(&mut self, clock: &dyn Clock) -> bool {
        match self.store.load_notes().await {
            Ok(None) => {}
            Ok(Some(_)) => return false,
            Err(e) => {
                warn!("Skipping welcome note, notes unreadable: {}", e);
                return false;
            }
        }

        self.notes = vec![Note::with_id(
            NoteId::from(WELCOME_NOTE_ID),
            WELCOME_TITLE,
            WELCOME_CONTENT,
            clock.now(),
        )];
        let seeded = self.persist().await.is_persisted();
        if seeded {
            info!("Welcome note created");
        }
        seeded
    }

    /// Error from the most recent write, cleared by the next successful one
    pub fn last_write_error(&self) -> Option<&StorageError> {
        self.last_write_error.as_ref()
    }

    /// All notes, most recent first
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Get a note by ID
    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    /// Position of a note in display order
    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| &n.id == id)
    }

    /// Replace the note with the same ID in place, or insert it at the front
    pub async fn upsert(&mut self, note: Note) -> WriteOutcome {
        match self.position(&note.id) {
            Some(index) => {
                debug!("Updating note {} at position {}", note.id, index);
                self.notes[index] = note;
            }
            None => {
                debug!("Inserting note {}", note.id);
                self.notes.insert(0, note);
            }
        }
        self.persist().await
    }

    /// Remove a note; unknown IDs are ignored
    pub async fn delete(&mut self, id: &NoteId) -> WriteOutcome {
        let Some(index) = self.position(id) else {
            debug!("Delete of unknown note {} ignored", id);
            return WriteOutcome::Unchanged;
        };
        self.notes.remove(index);
        self.persist().await
    }

    /// Notes whose title or content contains `query`, ignoring case
    ///
    /// The query is matched as typed, so surrounding spaces count. An empty
    /// query matches every note. The collection is not modified.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return self.notes.iter().collect();
        }
        self.notes.iter().filter(|n| n.matches(&needle)).collect()
    }

    /// Write the whole collection
    async fn persist(&mut self) -> WriteOutcome {
        match self.store.save_notes(&self.notes).await {
            Ok(()) => {
                self.last_write_error = None;
                WriteOutcome::Persisted
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!("Failed to save notes, keeping them in memory: {}", e.describe());
                } else {
                    error!("Failed to save notes, keeping them in memory: {}", e.describe());
                }
                self.last_write_error = Some(e);
                WriteOutcome::Unsaved
            }
        }
    }
}

/// Drop later entries that repeat an earlier ID
fn dedupe(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = HashSet::new();
    let before = notes.len();
    let unique: Vec<Note> = notes
        .into_iter()
        .filter(|n| seen.insert(n.id.clone()))
        .collect();
    if unique.len() != before {
        warn!("Dropped {} stored note(s) with duplicate IDs", before - unique.len());
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::{MemoryStorage, NOTES_KEY};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn repo() -> (NoteRepository<MemoryStorage>, MemoryStorage) {
        let area = MemoryStorage::new();
        (NoteRepository::new(PersistentStore::new(area.clone())), area)
    }

    #[tokio::test]
    async fn test_load_empty_when_nothing_stored() {
        let (mut repo, _) = repo();
        repo.load().await;
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        let (mut repo, area) = repo();
        assert!(repo.upsert(Note::new("a", "b", at(1))).await.is_persisted());

        area.fail_reads(true);
        repo.load().await;
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_degrades_to_empty() {
        let (mut repo, area) = repo();
        area.insert_raw(NOTES_KEY, json!("garbage"));
        repo.load().await;
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_inserts_new_notes_at_front() {
        let (mut repo, _) = repo();
        let first = Note::new("first", "", at(1));
        let second = Note::new("second", "", at(2));

        assert_eq!(repo.upsert(first.clone()).await, WriteOutcome::Persisted);
        assert_eq!(repo.upsert(second.clone()).await, WriteOutcome::Persisted);

        assert_eq!(repo.list()[0].id, second.id);
        assert_eq!(repo.list()[1].id, first.id);
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let (mut repo, _) = repo();
        let a = Note::new("a", "", at(1));
        let b = Note::new("b", "", at(2));
        let c = Note::new("c", "", at(3));
        for note in [a.clone(), b.clone(), c.clone()] {
            let _ = repo.upsert(note).await;
        }
        assert_eq!(repo.position(&b.id), Some(1));

        let mut edited = b.clone();
        edited.content = "changed".to_string();
        let _ = repo.upsert(edited).await;

        assert_eq!(repo.len(), 3);
        assert_eq!(repo.position(&b.id), Some(1));
        assert_eq!(repo.find(&b.id).unwrap().content, "changed");
    }

    #[tokio::test]
    async fn test_upserts_keep_one_entry_per_id() {
        let (mut repo, _) = repo();
        let ids: Vec<NoteId> = (0..3).map(|_| NoteId::generate()).collect();

        for round in 0..4 {
            for id in &ids {
                let note = Note::with_id(id.clone(), format!("round {}", round), "", at(round));
                let _ = repo.upsert(note).await;
            }
        }

        assert_eq!(repo.len(), ids.len());
        for id in &ids {
            assert_eq!(repo.find(id).unwrap().title, "round 3");
        }
    }

    #[tokio::test]
    async fn test_delete_then_find_is_none() {
        let (mut repo, _) = repo();
        let note = Note::new("doomed", "", at(1));
        let _ = repo.upsert(note.clone()).await;

        assert_eq!(repo.delete(&note.id).await, WriteOutcome::Persisted);
        assert!(repo.find(&note.id).is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop_and_idempotent() {
        let (mut repo, area) = repo();
        let _ = repo.upsert(Note::new("keep", "", at(1))).await;
        let writes = area.write_count();

        let missing = NoteId::from("missing");
        assert_eq!(repo.delete(&missing).await, WriteOutcome::Unchanged);
        assert_eq!(repo.delete(&missing).await, WriteOutcome::Unchanged);

        assert_eq!(repo.len(), 1);
        assert_eq!(area.write_count(), writes);
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let (mut repo, area) = repo();
        area.fail_writes(true);

        let note = Note::new("unsaved", "", at(1));
        assert_eq!(repo.upsert(note.clone()).await, WriteOutcome::Unsaved);
        assert!(repo.find(&note.id).is_some());
        assert!(matches!(
            repo.last_write_error(),
            Some(StorageError::Unavailable(_))
        ));

        // Later writes are attempted afresh
        area.fail_writes(false);
        let other = Note::new("saved", "", at(2));
        assert_eq!(repo.upsert(other).await, WriteOutcome::Persisted);
        assert!(repo.last_write_error().is_none());

        let mut reloaded = NoteRepository::new(PersistentStore::new(area));
        reloaded.load().await;
        assert_eq!(reloaded.len(), 2);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let (mut repo, area) = repo();
        for i in 0..3 {
            let _ = repo.upsert(Note::new(format!("n{}", i), "body", at(i))).await;
        }

        let mut reloaded = NoteRepository::new(PersistentStore::new(area));
        reloaded.load().await;
        assert_eq!(reloaded.list(), repo.list());
    }

    #[tokio::test]
    async fn test_load_drops_duplicate_ids() {
        let (mut repo, area) = repo();
        area.insert_raw(
            NOTES_KEY,
            json!([
                {"id": "1", "title": "first", "content": "", "createdAt": 1, "updatedAt": 1},
                {"id": "1", "title": "dupe", "content": "", "createdAt": 2, "updatedAt": 2},
            ]),
        );
        repo.load().await;
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.list()[0].title, "first");
    }

    #[tokio::test]
    async fn test_search_matches_title_or_content() {
        let (mut repo, _) = repo();
        let _ = repo.upsert(Note::new("Shopping", "eggs", at(1))).await;
        let target = Note::new("Ideas", "a FOOtball app", at(2));
        let _ = repo.upsert(target.clone()).await;
        let _ = repo.upsert(Note::new("Todo", "laundry", at(3))).await;

        let hits = repo.search("foo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, target.id);

        assert_eq!(repo.search("SHOP").len(), 1);
        assert_eq!(repo.search("").len(), 3);
        assert!(repo.search("nothing").is_empty());
        assert_eq!(repo.len(), 3);
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_spaces() {
        let (mut repo, _) = repo();
        let _ = repo.upsert(Note::new("undo", "", at(1))).await;
        let spaced = Note::new("to do", "", at(2));
        let _ = repo.upsert(spaced.clone()).await;

        let hits = repo.search(" do");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, spaced.id);

        assert_eq!(repo.search("do").len(), 2);
        assert!(repo.search("   ").is_empty());
    }

    #[tokio::test]
    async fn test_seed_welcome_only_when_never_stored() {
        let (mut repo, area) = repo();
        let clock = ManualClock::at_millis(500);

        assert!(repo.seed_welcome(&clock).await);
        assert_eq!(repo.list()[0].id, NoteId::from(WELCOME_NOTE_ID));
        assert_eq!(repo.list()[0].created_at, at(500));

        let _ = repo.delete(&NoteId::from(WELCOME_NOTE_ID)).await;
        assert!(!repo.seed_welcome(&clock).await);

        let mut reloaded = NoteRepository::new(PersistentStore::new(area));
        reloaded.load().await;
        assert!(reloaded.is_empty());
    }
}
