//! Editor session
//!
//! Tracks whether the user is in the list view (`Idle`) or editing a draft,
//! either for a new note or an existing one.
//!
//! ## Autosave
//!
//! Every draft change reschedules a single autosave timer. The timer runs as
//! a spawned task that sleeps until its deadline and then sends its
//! generation number back over a channel; the session owner receives it with
//! `next_autosave()` and applies it with `apply_autosave()` on its own task.
//! A newer draft change aborts the pending timer, and a stale generation that
//! was already in flight is rejected on arrival.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::clock::Clock;
use crate::models::{Draft, Note, NoteId, UNTITLED};
use crate::repository::{NoteRepository, WriteOutcome};
use crate::storage::StorageArea;

/// Quiet period after the last draft change before autosave fires
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// Which note the draft belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    /// A note that does not exist yet; its ID is allocated up front
    New(NoteId),
    /// A stored note
    Existing(NoteId),
}

impl EditMode {
    pub fn id(&self) -> &NoteId {
        match self {
            EditMode::New(id) | EditMode::Existing(id) => id,
        }
    }
}

/// Current editor state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// List view, no draft
    #[default]
    Idle,
    /// A draft is open
    Editing { mode: EditMode, draft: Draft },
}

/// What a save request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The draft was written to the repository
    Saved { id: NoteId, write: WriteOutcome },
    /// The draft was blank, so the edit was cancelled
    Discarded,
    /// There was no draft to save
    NotEditing,
}

/// Notice that an autosave timer expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveDue {
    generation: u64,
}

/// The single pending autosave timer
struct AutosaveTimer {
    delay: Duration,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<AutosaveDue>,
    rx: mpsc::UnboundedReceiver<AutosaveDue>,
}

impl AutosaveTimer {
    fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            delay,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    /// Cancel any pending timer and start a new one
    fn schedule(&mut self) {
        self.cancel();
        self.generation += 1;

        let due = AutosaveDue {
            generation: self.generation,
        };
        let deadline = Instant::now() + self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(due);
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// True if `due` belongs to the timer that is currently pending
    fn accept(&mut self, due: AutosaveDue) -> bool {
        if self.pending.is_some() && due.generation == self.generation {
            self.pending = None;
            true
        } else {
            debug!("Ignoring stale autosave #{}", due.generation);
            false
        }
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Editing state machine with debounced autosave
pub struct EditorSession {
    state: SessionState,
    autosave: AutosaveTimer,
}

impl EditorSession {
    pub fn new(autosave_delay: Duration) -> Self {
        Self {
            state: SessionState::Idle,
            autosave: AutosaveTimer::new(autosave_delay),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SessionState::Editing { .. })
    }

    pub fn mode(&self) -> Option<&EditMode> {
        match &self.state {
            SessionState::Editing { mode, .. } => Some(mode),
            SessionState::Idle => None,
        }
    }

    /// ID of the note being edited
    pub fn editing_id(&self) -> Option<&NoteId> {
        self.mode().map(EditMode::id)
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            SessionState::Editing { draft, .. } => Some(draft),
            SessionState::Idle => None,
        }
    }

    /// True while an autosave timer is waiting to fire
    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Open an empty draft for a new note
    ///
    /// The note's ID is allocated now rather than at save time. Any open
    /// draft is discarded.
    pub fn start_new(&mut self) -> NoteId {
        self.autosave.cancel();
        let id = NoteId::generate();
        debug!("Editing new note {}", id);
        self.state = SessionState::Editing {
            mode: EditMode::New(id.clone()),
            draft: Draft::default(),
        };
        id
    }

    /// Open a draft holding a stored note's title and content
    ///
    /// Returns false and leaves the state alone if the note is unknown.
    pub fn start_edit<S: StorageArea>(&mut self, repo: &NoteRepository<S>, id: &NoteId) -> bool {
        let Some(note) = repo.find(id) else {
            debug!("Cannot edit unknown note {}", id);
            return false;
        };
        self.autosave.cancel();
        self.state = SessionState::Editing {
            mode: EditMode::Existing(id.clone()),
            draft: Draft::from_note(note),
        };
        true
    }

    /// Replace the draft without touching the autosave timer
    ///
    /// Returns false when idle.
    pub fn update_draft(&mut self, new_draft: Draft) -> bool {
        match &mut self.state {
            SessionState::Editing { draft, .. } => {
                *draft = new_draft;
                true
            }
            SessionState::Idle => false,
        }
    }

    /// Replace the draft and restart the autosave timer
    ///
    /// Must be called from within a tokio runtime. Ignored when idle.
    pub fn autosave_tick(&mut self, draft: Draft) -> bool {
        if !self.update_draft(draft) {
            return false;
        }
        self.autosave.schedule();
        true
    }

    /// Write the draft to the repository and return to `Idle`
    ///
    /// A draft that is blank after trimming cancels the edit instead; an
    /// existing note is left exactly as it was.
    pub async fn save<S: StorageArea>(
        &mut self,
        repo: &mut NoteRepository<S>,
        clock: &dyn Clock,
    ) -> SaveOutcome {
        let SessionState::Editing { mode, draft } = &self.state else {
            return SaveOutcome::NotEditing;
        };

        let draft = draft.trimmed();
        if draft.is_blank() {
            self.cancel();
            return SaveOutcome::Discarded;
        }

        let id = mode.id().clone();
        let now = clock.now();
        let created_at = repo.find(&id).map(|n| n.created_at).unwrap_or(now);
        let title = if draft.title.is_empty() {
            UNTITLED.to_string()
        } else {
            draft.title
        };

        let note = Note {
            id: id.clone(),
            title,
            content: draft.content,
            created_at,
            updated_at: now,
        };
        let write = repo.upsert(note).await;
        self.reset();
        SaveOutcome::Saved { id, write }
    }

    /// Discard the draft and return to `Idle`
    pub fn cancel(&mut self) {
        if self.is_editing() {
            debug!("Edit cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.autosave.cancel();
        self.state = SessionState::Idle;
    }

    /// Wait for the next autosave timer to expire
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` loop.
    pub async fn next_autosave(&mut self) -> Option<AutosaveDue> {
        self.autosave.rx.recv().await
    }

    /// An expired autosave timer, if one is waiting to be applied
    pub fn try_next_autosave(&mut self) -> Option<AutosaveDue> {
        self.autosave.rx.try_recv().ok()
    }

    /// Save the draft for an expired timer
    ///
    /// Returns `None` when the timer was superseded, the session is idle, or
    /// the draft is blank.
    pub async fn apply_autosave<S: StorageArea>(
        &mut self,
        due: AutosaveDue,
        repo: &mut NoteRepository<S>,
        clock: &dyn Clock,
    ) -> Option<SaveOutcome> {
        if !self.autosave.accept(due) {
            return None;
        }
        if self.draft().map_or(true, Draft::is_blank) {
            return None;
        }
        debug!("Autosaving draft");
        Some(self.save(repo, clock).await)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}
