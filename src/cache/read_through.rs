//! Read-Through Cache
//!
//! Serves a payload from the key-value store when a live entry exists,
//! otherwise runs the supplied fetch, stores its result and returns it.
//! Concurrent misses on the same key share one in-flight fetch.
//!
//! Store failures never reach the caller: they are logged and the request
//! proceeds as if no cache were configured.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheCounters, CacheKey, CacheStats, KvStore};
use crate::error::Result;

/// A fetch that other callers can await alongside its initiator.
type PendingFetch = Shared<BoxFuture<'static, Result<Arc<str>>>>;

/// TTL read-through cache over an optional [`KvStore`].
pub struct ReadThroughCache {
    store: Option<Arc<dyn KvStore>>,
    prefix: String,
    ttl: Duration,
    pending: Mutex<HashMap<String, PendingFetch>>,
    counters: Arc<CacheCounters>,
    /// Bumped by every clear; fetches started earlier do not store results
    generation: Arc<AtomicU64>,
}

impl ReadThroughCache {
    /// Creates a cache namespaced under `prefix`. `None` runs without a store.
    pub fn new(store: Option<Arc<dyn KvStore>>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl,
            pending: Mutex::new(HashMap::new()),
            counters: Arc::new(CacheCounters::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store
            .as_ref()
            .map_or("none", |store| store.backend_name())
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Capacity evictions reported by the store, when it tracks them.
    pub async fn store_evictions(&self) -> Option<u64> {
        match &self.store {
            Some(store) => store.evictions().await,
            None => None,
        }
    }

    /// Returns the cached value for `key`, or fetches and caches it.
    ///
    /// With `skip_cache` the lookup is skipped and a fresh fetch always runs;
    /// its result still replaces the stored entry.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &CacheKey, skip_cache: bool, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let store_key = key.namespaced(&self.prefix);
        let generation = self.generation.load(Ordering::SeqCst);

        if skip_cache {
            self.counters.record_bypass();
            self.counters.record_upstream_fetch();
            debug!("Cache bypass for {}", store_key);

            let value = fetch().await?;
            let payload = serde_json::to_string(&value)?;
            let write = WriteBack {
                store_key: &store_key,
                ttl: self.ttl,
                counters: &self.counters,
                generation: (&*self.generation, generation),
            };
            write.run(self.store.as_deref(), &payload).await;
            return Ok(value);
        }

        if let Some(value) = self.lookup(&store_key).await {
            self.counters.record_hit();
            debug!("Cache hit for {}", store_key);
            return Ok(value);
        }
        self.counters.record_miss();
        debug!("Cache miss for {}", store_key);

        let pending = {
            let mut pending = self.pending.lock().await;
            match pending.get(&store_key) {
                Some(in_flight) => {
                    self.counters.record_coalesced();
                    debug!("Joining in-flight fetch for {}", store_key);
                    in_flight.clone()
                }
                None => {
                    let started = fill(
                        self.store.clone(),
                        store_key.clone(),
                        self.ttl,
                        Arc::clone(&self.counters),
                        (Arc::clone(&self.generation), generation),
                        fetch(),
                    )
                    .boxed()
                    .shared();
                    pending.insert(store_key.clone(), started.clone());
                    started
                }
            }
        };

        let result = pending.clone().await;

        // Whichever waiter finishes first retires the entry, unless a newer
        // fetch has already replaced it.
        {
            let mut map = self.pending.lock().await;
            if map
                .get(&store_key)
                .is_some_and(|current| current.ptr_eq(&pending))
            {
                map.remove(&store_key);
            }
        }

        let payload = result?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Removes every entry under this cache's namespace.
    ///
    /// Idempotent. Fails only when the store itself fails; without a store
    /// there is nothing to remove.
    pub async fn clear(&self) -> Result<usize> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending.lock().await.clear();

        let Some(store) = &self.store else {
            return Ok(0);
        };
        let removed = store.clear_prefix(&format!("{}:", self.prefix)).await?;
        info!("Cleared {} cache entries under '{}'", removed, self.prefix);
        Ok(removed)
    }

    /// Closes the underlying store.
    pub async fn close(&self) {
        if let Some(store) = &self.store {
            store.close().await;
        }
    }

    async fn lookup<T: DeserializeOwned>(&self, store_key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        match store.get(store_key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => Some(value),
                Err(e) => {
                    self.counters.record_fallback();
                    warn!("Discarding undecodable cache entry {}: {}", store_key, e);
                    if let Err(e) = store.delete(store_key).await {
                        warn!("Failed to drop cache entry {}: {}", store_key, e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                self.counters.record_fallback();
                warn!("Cache read for {} failed, treating as miss: {}", store_key, e);
                None
            }
        }
    }
}

/// Runs a fetch and stores its serialized result.
async fn fill<T, Fut>(
    store: Option<Arc<dyn KvStore>>,
    store_key: String,
    ttl: Duration,
    counters: Arc<CacheCounters>,
    (generation, started): (Arc<AtomicU64>, u64),
    fetch: Fut,
) -> Result<Arc<str>>
where
    T: Serialize,
    Fut: Future<Output = Result<T>>,
{
    counters.record_upstream_fetch();
    let value = fetch.await?;
    let payload = serde_json::to_string(&value)?;
    let write = WriteBack {
        store_key: &store_key,
        ttl,
        counters: &counters,
        generation: (&*generation, started),
    };
    write.run(store.as_deref(), &payload).await;
    Ok(Arc::from(payload))
}

/// Stores one fetched payload unless a clear ran since the fetch began.
struct WriteBack<'a> {
    store_key: &'a str,
    ttl: Duration,
    counters: &'a CacheCounters,
    /// Current clear counter and its value when the fetch began
    generation: (&'a AtomicU64, u64),
}

impl WriteBack<'_> {
    fn cleared(&self) -> bool {
        let (current, started) = self.generation;
        current.load(Ordering::SeqCst) != started
    }

    async fn run(&self, store: Option<&dyn KvStore>, payload: &str) {
        let Some(store) = store else {
            return;
        };
        if self.cleared() {
            debug!("Cache cleared while fetching {}, result not stored", self.store_key);
            return;
        }

        if let Err(e) = store.set(self.store_key, payload, self.ttl).await {
            self.counters.record_fallback();
            warn!(
                "Cache write for {} failed, continuing without cache: {}",
                self.store_key, e
            );
            return;
        }

        // A clear that landed during the write still wins
        if self.cleared() {
            if let Err(e) = store.delete(self.store_key).await {
                self.counters.record_fallback();
                warn!("Failed to drop stale cache entry {}: {}", self.store_key, e);
            }
        }
    }
}
