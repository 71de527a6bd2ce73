//! Jotpad Core Library
//!
//! This crate provides the core functionality for Jotpad, a small personal
//! notepad with persisted local storage, a light/dark theme, debounced
//! autosave, and a "capture selected text" shortcut.
//!
//! # Architecture
//!
//! - **Storage**: asynchronous key-value area holding `notes` and `theme`
//! - **Repository**: in-memory note collection mirrored to storage
//! - **Session**: editing state machine with a cancellable autosave timer
//! - **Capture**: selected text to a new note
//! - **Notepad**: typed command dispatch over all of the above
//!
//! Storage failures are logged and absorbed; nothing here returns an error
//! for a failed read or write.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut pad = Notepad::new(FileStorage::from_config(&config), (&config).into());
//! pad.load().await;
//!
//! pad.dispatch(Command::Capture("some selected text".into())).await;
//! let notes = pad.snapshot().notes;
//! ```
//!
//! # Modules
//!
//! - `notepad`: Command dispatch and snapshots (main entry point)
//! - `models`: Note, Draft, and Theme
//! - `repository`: Note collection operations
//! - `session`: Editor state and autosave
//! - `capture`: Selection capture
//! - `storage`: Storage areas and typed persistence
//! - `config`: Application configuration

pub mod capture;
pub mod clock;
pub mod config;
pub mod models;
pub mod notepad;
pub mod notify;
pub mod repository;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use models::{Draft, Note, NoteId, Theme};
pub use notepad::{
    AlwaysConfirm, Command, ConfirmDelete, Notepad, NotepadOptions, Outcome, Snapshot,
};
pub use notify::{LogNotifier, Notifier};
pub use repository::{NoteRepository, WriteOutcome};
pub use session::{EditMode, EditorSession, SaveOutcome, SessionState};
pub use storage::{FileStorage, MemoryStorage, PersistentStore, StorageArea, StorageError};
