//! Storage layer
//!
//! Notes and the theme preference live under two top-level keys of an
//! asynchronous key-value storage area.
//!
//! ## Architecture
//!
//! - **`StorageArea`**: raw JSON values by key (file-backed or in-memory)
//! - **`PersistentStore`**: typed reads and writes of `notes` and `theme`
//!
//! Writes always replace the whole value stored under a key.

use std::future::Future;

use serde_json::Value;

pub mod error;
pub mod file;
pub mod memory;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use persistence::{PersistentStore, NOTES_KEY, THEME_KEY};

/// An asynchronous key-value storage area
pub trait StorageArea: Send + Sync {
    /// Read the value stored under `key`, if any
    fn get(&self, key: &str) -> impl Future<Output = StorageResult<Option<Value>>> + Send;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: Value) -> impl Future<Output = StorageResult<()>> + Send;
}
