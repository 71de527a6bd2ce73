//! The notepad: the object a presentation layer holds
//!
//! `Notepad` ties the repository, the editor session, and the theme
//! preference together behind a typed command interface.
//!
//! ## Usage
//!
//! ```ignore
//! let mut pad = Notepad::new(FileStorage::from_config(&config), (&config).into());
//! pad.load().await;
//!
//! pad.dispatch(Command::StartNew).await;
//! pad.dispatch(Command::UpdateDraft(Draft::new("Title", "Body"))).await;
//! pad.dispatch(Command::Save).await;
//!
//! let snapshot = pad.snapshot();
//! ```
//!
//! Every state change bumps a revision number on a watch channel, so a
//! renderer can `subscribe()` and redraw when it changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::capture::capture_selection;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::models::{Draft, Note, NoteId, Theme};
use crate::notify::{LogNotifier, Notifier};
use crate::repository::{NoteRepository, WriteOutcome};
use crate::session::{
    AutosaveDue, EditorSession, SaveOutcome, SessionState, DEFAULT_AUTOSAVE_DELAY,
};
use crate::storage::{PersistentStore, StorageArea};

/// Settings for a notepad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotepadOptions {
    pub autosave_delay: Duration,
    pub seed_welcome: bool,
}

impl Default for NotepadOptions {
    fn default() -> Self {
        Self {
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            seed_welcome: true,
        }
    }
}

impl From<&Config> for NotepadOptions {
    fn from(config: &Config) -> Self {
        Self {
            autosave_delay: config.autosave_delay(),
            seed_welcome: config.seed_welcome,
        }
    }
}

/// Asks the user whether a note may be deleted
pub trait ConfirmDelete: Send + Sync {
    fn confirm_delete(&self, note: &Note) -> bool;
}

/// Approves every delete
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmDelete for AlwaysConfirm {
    fn confirm_delete(&self, _note: &Note) -> bool {
        true
    }
}

impl<F> ConfirmDelete for F
where
    F: Fn(&Note) -> bool + Send + Sync,
{
    fn confirm_delete(&self, note: &Note) -> bool {
        self(note)
    }
}

/// Requests a presentation layer can make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open an empty draft
    StartNew,
    /// Open a stored note for editing
    StartEdit(NoteId),
    /// Replace the draft (one keystroke) and restart the autosave timer
    UpdateDraft(Draft),
    /// Save the draft
    Save,
    /// Discard the draft
    Cancel,
    /// Delete a note after confirmation
    Delete(NoteId),
    /// Filter the visible notes
    Search(String),
    /// Switch between light and dark
    ToggleTheme,
    /// Add selected text as a note
    Capture(String),
}

/// Result of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A draft is open for this note
    Editing(NoteId),
    /// The draft was replaced
    DraftUpdated,
    /// A save request finished
    Saved(SaveOutcome),
    /// The draft was discarded
    Cancelled,
    /// A delete finished (`Unchanged` when the note did not exist)
    Deleted(WriteOutcome),
    /// The user declined a delete
    Declined,
    /// Number of notes matching the new search
    Filtered(usize),
    /// The theme now in effect
    Theme(Theme),
    /// Selected text became this note
    Captured(NoteId),
    /// The command did not apply in the current state
    Ignored,
}

/// Read-only view of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Notes matching the current search, most recent first
    pub notes: Vec<Note>,
    pub session: SessionState,
    pub theme: Theme,
    pub query: String,
}

/// Note collection, editor session, and theme for one user
pub struct Notepad<S> {
    repo: NoteRepository<S>,
    session: EditorSession,
    theme: Theme,
    query: String,
    options: NotepadOptions,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn ConfirmDelete>,
    revision: watch::Sender<u64>,
}

impl<S: StorageArea> Notepad<S> {
    /// Create a notepad over a storage area; call `load()` before use
    pub fn new(area: S, options: NotepadOptions) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            repo: NoteRepository::new(PersistentStore::new(area)),
            session: EditorSession::new(options.autosave_delay),
            theme: Theme::default(),
            query: String::new(),
            options,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(LogNotifier),
            confirm: Arc::new(AlwaysConfirm),
            revision,
        }
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different confirmation channel
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Use a different delete guard
    pub fn with_confirm(mut self, confirm: Arc<dyn ConfirmDelete>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Read notes and theme from storage
    ///
    /// Seeds the welcome note first when enabled and nothing was stored yet.
    /// Never fails; unreadable data degrades to defaults.
    pub async fn load(&mut self) {
        if self.options.seed_welcome {
            self.repo.seed_welcome(self.clock.as_ref()).await;
        }
        self.repo.load().await;

        self.theme = match self.repo.store().load_theme().await {
            Ok(theme) => theme.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to load theme, using default: {}", e);
                Theme::default()
            }
        };

        info!("Notepad loaded with {} note(s)", self.repo.len());
        self.bump();
    }

    /// Apply a command
    pub async fn dispatch(&mut self, command: Command) -> Outcome {
        debug!("Dispatching {:?}", command);
        let outcome = match command {
            Command::StartNew => Outcome::Editing(self.session.start_new()),
            Command::StartEdit(id) => {
                if self.session.start_edit(&self.repo, &id) {
                    Outcome::Editing(id)
                } else {
                    Outcome::Ignored
                }
            }
            Command::UpdateDraft(draft) => {
                if self.session.autosave_tick(draft) {
                    Outcome::DraftUpdated
                } else {
                    Outcome::Ignored
                }
            }
            Command::Save => Outcome::Saved(self.save().await),
            Command::Cancel => {
                self.session.cancel();
                Outcome::Cancelled
            }
            Command::Delete(id) => self.delete(&id).await,
            Command::Search(query) => Outcome::Filtered(self.search(query)),
            Command::ToggleTheme => Outcome::Theme(self.toggle_theme().await),
            Command::Capture(text) => match self.capture(&text).await {
                Some(id) => Outcome::Captured(id),
                None => Outcome::Ignored,
            },
        };

        if outcome != Outcome::Ignored {
            self.bump();
        }
        outcome
    }

    async fn save(&mut self) -> SaveOutcome {
        self.session.save(&mut self.repo, self.clock.as_ref()).await
    }

    async fn delete(&mut self, id: &NoteId) -> Outcome {
        let Some(note) = self.repo.find(id) else {
            return Outcome::Deleted(WriteOutcome::Unchanged);
        };
        if !self.confirm.confirm_delete(note) {
            debug!("Delete of {} declined", id);
            return Outcome::Declined;
        }

        let write = self.repo.delete(id).await;
        if self.session.editing_id() == Some(id) {
            self.session.cancel();
        }
        Outcome::Deleted(write)
    }

    fn search(&mut self, query: String) -> usize {
        self.query = query;
        self.repo.search(&self.query).len()
    }

    async fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.repo.store().save_theme(self.theme).await {
            warn!("Failed to save theme: {}", e);
        }
        self.theme
    }

    async fn capture(&mut self, text: &str) -> Option<NoteId> {
        capture_selection(
            &mut self.repo,
            self.clock.as_ref(),
            self.notifier.as_ref(),
            Some(text),
        )
        .await
    }

    /// Wait for the autosave timer to expire
    ///
    /// Cancel-safe; pair it with `apply_autosave()` in a `tokio::select!` loop.
    pub async fn next_autosave(&mut self) -> Option<AutosaveDue> {
        self.session.next_autosave().await
    }

    /// Save the draft for an expired autosave timer
    pub async fn apply_autosave(&mut self, due: AutosaveDue) -> Option<SaveOutcome> {
        let outcome = self
            .session
            .apply_autosave(due, &mut self.repo, self.clock.as_ref())
            .await;
        if outcome.is_some() {
            self.bump();
        }
        outcome
    }

    /// Wait for the next autosave and apply it
    ///
    /// Expiries left over from superseded timers are skipped. Returns `None`
    /// once no timer is pending or the draft was blank.
    pub async fn run_autosave(&mut self) -> Option<SaveOutcome> {
        while self.session.autosave_pending() {
            let due = self.next_autosave().await?;
            if let Some(outcome) = self.apply_autosave(due).await {
                return Some(outcome);
            }
        }
        None
    }

    /// Receive a new revision number after every state change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision number
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Everything a renderer needs, filtered by the current search
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self.repo.search(&self.query).into_iter().cloned().collect(),
            session: self.session.state().clone(),
            theme: self.theme,
            query: self.query.clone(),
        }
    }

    /// All notes regardless of the current search
    pub fn notes(&self) -> &[Note] {
        self.repo.list()
    }

    pub fn find(&self, id: &NoteId) -> Option<&Note> {
        self.repo.find(id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn repository(&self) -> &NoteRepository<S> {
        &self.repo
    }
}
