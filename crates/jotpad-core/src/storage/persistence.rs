//! Typed persistence of notes and the theme preference
//!
//! Keys:
//! - `notes` - ordered array of notes, most recent first
//! - `theme` - `"light"` or `"dark"`

use serde_json::Value;
use tracing::debug;

use super::{StorageArea, StorageError, StorageResult};
use crate::models::{Note, Theme};

/// Storage key holding the note collection
pub const NOTES_KEY: &str = "notes";

/// Storage key holding the theme preference
pub const THEME_KEY: &str = "theme";

/// Reads and writes the two top-level keys of a storage area
#[derive(Debug, Clone)]
pub struct PersistentStore<S> {
    area: S,
}

impl<S: StorageArea> PersistentStore<S> {
    pub fn new(area: S) -> Self {
        Self { area }
    }

    /// Get the underlying storage area
    pub fn area(&self) -> &S {
        &self.area
    }

    /// Load the note collection
    ///
    /// Returns `None` if nothing has been stored under `notes` yet.
    pub async fn load_notes(&self) -> StorageResult<Option<Vec<Note>>> {
        match self.area.get(NOTES_KEY).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    key: NOTES_KEY.to_string(),
                    details: e.to_string(),
                }),
        }
    }

    /// Overwrite the stored note collection
    pub async fn save_notes(&self, notes: &[Note]) -> StorageResult<()> {
        let value = serde_json::to_value(notes)?;
        self.area.set(NOTES_KEY, value).await?;
        debug!("Saved {} note(s)", notes.len());
        Ok(())
    }

    /// Load the theme preference
    ///
    /// Unknown theme names read as the default theme.
    pub async fn load_theme(&self) -> StorageResult<Option<Theme>> {
        match self.area.get(THEME_KEY).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(name)) => Ok(Some(Theme::from_stored(&name))),
            Some(other) => Err(StorageError::Corrupt {
                key: THEME_KEY.to_string(),
                details: format!("expected a string, found {}", other),
            }),
        }
    }

    /// Overwrite the stored theme preference
    pub async fn save_theme(&self, theme: Theme) -> StorageResult<()> {
        self.area
            .set(THEME_KEY, Value::String(theme.as_str().to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use chrono::DateTime;
    use serde_json::json;
    use tempfile::TempDir;

    fn note(title: &str, ms: i64) -> Note {
        Note::new(title, format!("{} body", title), DateTime::from_timestamp_millis(ms).unwrap())
    }

    #[tokio::test]
    async fn test_save_and_load_notes_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = PersistentStore::new(FileStorage::new(temp_dir.path().join("storage.json")));

        assert!(store.load_notes().await.unwrap().is_none());

        let notes = vec![note("second", 200), note("first", 100)];
        store.save_notes(&notes).await.unwrap();

        let loaded = store.load_notes().await.unwrap().unwrap();
        assert_eq!(loaded, notes);
    }

    #[tokio::test]
    async fn test_theme_and_notes_are_independent() {
        let store = PersistentStore::new(MemoryStorage::new());

        store.save_theme(Theme::Dark).await.unwrap();
        store.save_notes(&[note("a", 1)]).await.unwrap();

        assert_eq!(store.load_theme().await.unwrap(), Some(Theme::Dark));
        assert_eq!(store.load_notes().await.unwrap().unwrap().len(), 1);
        assert_eq!(store.area().raw(THEME_KEY), Some(json!("dark")));
    }

    #[tokio::test]
    async fn test_undecodable_notes_are_corrupt() {
        let area = MemoryStorage::new();
        area.insert_raw(NOTES_KEY, json!({"not": "a list"}));
        let store = PersistentStore::new(area);

        let err = store.load_notes().await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_unknown_theme_falls_back_to_light() {
        let area = MemoryStorage::new();
        area.insert_raw(THEME_KEY, json!("sepia"));
        let store = PersistentStore::new(area.clone());
        assert_eq!(store.load_theme().await.unwrap(), Some(Theme::Light));

        area.insert_raw(THEME_KEY, json!(42));
        assert!(store.load_theme().await.is_err());
    }
}
