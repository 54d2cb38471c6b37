//! Cache Module
//!
//! Read-through caching of upstream collections over a pluggable key-value
//! store, with TTL expiry and explicit invalidation.

mod entry;
mod keys;
mod memory;
mod read_through;
mod redis_store;
mod stats;
mod store;

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{CacheBackend, Config};

// Re-export public types
pub use entry::CacheEntry;
pub use keys::CacheKey;
pub use memory::{MemoryStore, SharedMemoryStore};
pub use read_through::ReadThroughCache;
pub use redis_store::RedisStore;
pub use stats::{CacheCounters, CacheStats};
pub use store::KvStore;

// == Public Constants ==
/// Maximum allowed key length in bytes for the in-process store
pub const MAX_KEY_LENGTH: usize = 512;

/// Store selected at startup.
///
/// `memory` is kept separately so the cleanup task can purge it.
#[derive(Default)]
pub struct ConfiguredStore {
    pub kv: Option<Arc<dyn KvStore>>,
    pub memory: Option<SharedMemoryStore>,
}

/// Opens the store named by the configuration.
///
/// An unreachable Redis is logged and leaves the gateway without a cache; it
/// never prevents startup.
pub async fn connect_store(config: &Config) -> ConfiguredStore {
    match config.cache_backend {
        CacheBackend::Redis => {
            let Some(url) = config.redis_url.as_deref() else {
                return ConfiguredStore::default();
            };
            match RedisStore::open(url).await {
                Ok(store) => ConfiguredStore {
                    kv: Some(Arc::new(store)),
                    memory: None,
                },
                Err(e) => {
                    warn!("Redis unavailable, running without cache: {}", e);
                    ConfiguredStore::default()
                }
            }
        }
        CacheBackend::Memory => {
            let store = MemoryStore::shared(config.memory_max_entries);
            info!(
                "Using in-process cache store (max {} entries)",
                config.memory_max_entries
            );
            ConfiguredStore {
                kv: Some(store.clone()),
                memory: Some(store),
            }
        }
        CacheBackend::None => {
            info!("No cache store configured, every request goes upstream");
            ConfiguredStore::default()
        }
    }
}
