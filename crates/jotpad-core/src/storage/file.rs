//! File-backed storage area
//!
//! All keys are kept in one JSON object file. Uses atomic writes (write to
//! temp file, then rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/jotpad/storage.json` (configurable via `Config`)

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use super::{StorageArea, StorageError, StorageResult};
use crate::config::Config;

/// Storage area persisted as a single JSON file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage file inside the configured data directory
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the storage file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every key. A missing or empty file holds no keys.
    async fn read_all(&self) -> StorageResult<Map<String, Value>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StorageError::from_read_io(e, self.path.clone())),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            key: self.path.display().to_string(),
            details: e.to_string(),
        })
    }
}

impl StorageArea for FileStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let mut values = self.read_all().await?;
        Ok(values.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut values = match self.read_all().await {
            Ok(values) => values,
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!("Replacing unreadable storage file: {}", e);
                Map::new()
            }
            Err(e) => return Err(e),
        };

        values.insert(key.to_string(), value);
        let bytes = serde_json::to_vec_pretty(&Value::Object(values))?;
        atomic_write(&self.path, &bytes).await?;
        debug!("Wrote key '{}' to {:?}", key, self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
async fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .await
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
