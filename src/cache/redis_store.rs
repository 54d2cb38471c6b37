//! Redis Store
//!
//! External key-value store backed by Redis. The connection is opened
//! explicitly and closed on shutdown; there is no process-wide singleton.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::entry::MAX_ENTRY_TTL;
use crate::cache::KvStore;
use crate::error::{StoreError, StoreResult};

/// Keys requested per SCAN round trip.
const SCAN_BATCH: usize = 200;

/// Redis-backed [`KvStore`].
pub struct RedisStore {
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Connects to `url` and verifies the server answers.
    pub async fn open(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        let store = Self {
            conn: RwLock::new(Some(conn)),
        };
        store.ping().await?;
        info!("Connected to Redis cache store");
        Ok(store)
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        self.conn.read().await.clone().ok_or(StoreError::Closed)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        // SETEX rejects a zero expiry
        let seconds = ttl.min(MAX_ENTRY_TTL).as_secs().max(1);
        let _: () = conn.set_ex(key, value, seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let removed: usize = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn clear_prefix(&self, prefix: &str) -> StoreResult<usize> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut removed = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: usize = conn.del(&keys).await?;
                removed += deleted;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Removed {} Redis keys matching {}", removed, pattern);
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn close(&self) {
        if self.conn.write().await.take().is_some() {
            info!("Closed Redis cache store connection");
        }
    }
}

/// Escapes Redis glob metacharacters so a prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("buildout:"), "buildout:");
        assert_eq!(escape_glob("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_url() {
        let result = RedisStore::open("not-a-redis-url").await;
        assert!(matches!(result, Err(StoreError::Redis(_))));
    }

    #[tokio::test]
    async fn test_open_fails_when_unreachable() {
        // Port 1 is never a Redis server
        let result = RedisStore::open("redis://127.0.0.1:1/").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = RedisStore {
            conn: RwLock::new(None),
        };
        assert!(matches!(store.get("k").await, Err(StoreError::Closed)));
        assert!(matches!(
            store.clear_prefix("buildout:").await,
            Err(StoreError::Closed)
        ));
        // Closing twice is harmless
        store.close().await;
        store.close().await;
    }
}
