//! In-memory storage area
//!
//! Clones share the same underlying map. Reads and writes can be switched to
//! fail, which is how tests exercise the degraded paths.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::{StorageArea, StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, Value>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// Shared in-process key-value map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent read fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Store a value directly, bypassing failure injection
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.lock().values.insert(key.to_string(), value);
    }

    /// Read a value directly, bypassing failure injection
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.lock().values.get(key).cloned()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(StorageError::Unavailable(format!("read of '{}' rejected", key)));
        }
        Ok(inner.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::Unavailable(format!("write of '{}' rejected", key)));
        }
        inner.values.insert(key.to_string(), value);
        inner.writes += 1;
        Ok(())
    }
}
