//! In-process key-value store.

use super::traits::KvBackend;
use crate::config::CacheConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Backend that keeps entries in a process-local map.
///
/// Behaves like the Redis backend from the cache's point of view (missing
/// keys read as `None`, deletes are idempotent) but nothing survives the
/// process. Useful for tests and for running a single instance locally.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw stored value for `key`, exactly as the cache wrote it.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    /// Store a raw value, bypassing the cache's encoding.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write().insert(key.into(), value.into());
    }

    // A writer that panicked mid-call cannot leave the map half-updated:
    // every mutation is a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read().get(key).map(|v| v.as_bytes().to_vec()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.write().remove(key).is_some())
    }

    fn describe(&self) -> String {
        CacheConfig::MEMORY_ADDR.to_string()
    }
}
