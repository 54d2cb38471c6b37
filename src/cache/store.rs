//! Key-Value Store Trait
//!
//! The seam between the read-through cache and whatever holds its entries.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

/// A TTL-capable key-value store holding serialized payloads.
///
/// Implementations must be safe to share across requests; the cache holds
/// them as `Arc<dyn KvStore>`.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Short backend identifier for logs and stats.
    fn backend_name(&self) -> &'static str;

    /// Returns the live payload stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Removes `key`; returns whether an entry existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Removes every key starting with `prefix`; returns the number removed.
    async fn clear_prefix(&self, prefix: &str) -> StoreResult<usize>;

    /// Verifies the backend is reachable.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Entries dropped to respect a capacity bound, if the backend counts them.
    async fn evictions(&self) -> Option<u64> {
        None
    }

    /// Releases the backend connection. Later operations may fail.
    async fn close(&self) {}
}
