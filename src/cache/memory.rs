//! In-Process Store
//!
//! HashMap storage with per-entry TTL and least-recently-used eviction once
//! the configured capacity is reached.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, KvStore, MAX_KEY_LENGTH};
use crate::error::{StoreError, StoreResult};

/// Memory store shared between the cache and the cleanup task.
pub type SharedMemoryStore = Arc<RwLock<MemoryStore>>;

// == Memory Store ==
/// In-process TTL store.
#[derive(Debug)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
    /// Access order: front = most recently used
    order: VecDeque<String>,
    max_entries: usize,
    evictions: u64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries: max_entries.max(1),
            evictions: 0,
        }
    }

    /// Wraps a new store for sharing.
    pub fn shared(max_entries: usize) -> SharedMemoryStore {
        Arc::new(RwLock::new(Self::new(max_entries)))
    }

    // == Set ==
    /// Stores a payload, evicting the least recently used entry when full.
    pub fn set(&mut self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidEntry(format!(
                "key length must be between 1 and {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.order.pop_back() {
                self.entries.remove(&oldest);
                self.evictions += 1;
            }
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.touch(key);
        Ok(())
    }

    // == Get ==
    /// Returns the payload if present and live. Expired entries are dropped.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            self.remove(key);
            return None;
        }
        let value = entry.value.clone();
        self.touch(key);
        Some(value)
    }

    // == Delete ==
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key)
    }

    // == Clear Prefix ==
    /// Removes every entry whose key starts with `prefix`.
    pub fn clear_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        self.order.retain(|key| !key.starts_with(prefix));
        before - self.entries.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries; returns the number removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped to make room since creation.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }

    fn remove(&mut self, key: &str) -> bool {
        self.order.retain(|k| k != key);
        self.entries.remove(key).is_some()
    }
}

#[async_trait]
impl KvStore for RwLock<MemoryStore> {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        // Write lock: reads refresh recency and drop expired entries
        Ok(self.write().await.get(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        self.write().await.set(key, value.to_string(), ttl)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.write().await.delete(key))
    }

    async fn clear_prefix(&self, prefix: &str) -> StoreResult<usize> {
        Ok(self.write().await.clear_prefix(prefix))
    }

    async fn evictions(&self) -> Option<u64> {
        Some(self.read().await.evictions())
    }
}
