//! Buildout Service
//!
//! The operations behind the HTTP routes: cached upstream aggregations,
//! broker email resolution, filtered search and cache invalidation.

use std::sync::Arc;

use tracing::info;

use crate::buildout::{fetch_all_brokers, fetch_all_properties, PropertySource};
use crate::cache::{CacheKey, CacheStats, KvStore, ReadThroughCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::filter::PropertyFilter;
use crate::models::{BrokerCollection, PropertyCollection};

/// Cached access to upstream property and broker data.
pub struct BuildoutService {
    source: Arc<dyn PropertySource>,
    cache: ReadThroughCache,
    /// Page size for lookups that do not take one from the caller
    page_limit: u32,
}

impl BuildoutService {
    pub fn new(source: Arc<dyn PropertySource>, cache: ReadThroughCache, page_limit: u32) -> Self {
        Self {
            source,
            cache,
            page_limit,
        }
    }

    /// Builds the service from configuration and an already opened store.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn PropertySource>,
        store: Option<Arc<dyn KvStore>>,
    ) -> Self {
        let cache = ReadThroughCache::new(store, config.cache_prefix.clone(), config.ttl());
        Self::new(source, cache, config.default_page_limit)
    }

    /// Every property, or every property of one broker.
    pub async fn all_properties(
        &self,
        limit: u32,
        broker_id: Option<u64>,
        skip_cache: bool,
    ) -> Result<PropertyCollection> {
        let key = match broker_id {
            Some(id) => CacheKey::BrokerProperties(id),
            None => CacheKey::AllProperties,
        };
        let source = Arc::clone(&self.source);

        self.cache
            .get_or_fetch(&key, skip_cache, move || async move {
                fetch_all_properties(source.as_ref(), limit, broker_id).await
            })
            .await
    }

    /// Every property associated with `broker_id`.
    pub async fn properties_by_broker(
        &self,
        broker_id: u64,
        limit: u32,
        skip_cache: bool,
    ) -> Result<PropertyCollection> {
        self.all_properties(limit, Some(broker_id), skip_cache).await
    }

    /// Every broker.
    pub async fn brokers(&self, limit: u32, skip_cache: bool) -> Result<BrokerCollection> {
        let source = Arc::clone(&self.source);

        self.cache
            .get_or_fetch(&CacheKey::Brokers, skip_cache, move || async move {
                fetch_all_brokers(source.as_ref(), limit).await
            })
            .await
    }

    /// Resolves the upstream broker id owning `email`.
    ///
    /// Unknown emails fail with `NotFound` and are not cached.
    pub async fn broker_id_for_email(&self, email: &str, skip_cache: bool) -> Result<u64> {
        let key = CacheKey::broker_email(email);
        let email = email.trim().to_ascii_lowercase();
        let source = Arc::clone(&self.source);
        let limit = self.page_limit;

        self.cache
            .get_or_fetch(&key, skip_cache, move || async move {
                let collection = fetch_all_brokers(source.as_ref(), limit).await?;
                collection
                    .brokers
                    .iter()
                    .find(|broker| broker.has_email(&email))
                    .map(|broker| broker.id)
                    .ok_or_else(|| ApiError::NotFound(format!("No broker found with email {}", email)))
            })
            .await
    }

    /// Every property matching `filter`.
    pub async fn search_properties(
        &self,
        filter: &PropertyFilter,
        limit: u32,
        skip_cache: bool,
    ) -> Result<PropertyCollection> {
        let all = self.all_properties(limit, None, skip_cache).await?;
        let total = all.count;
        let properties = filter.apply(&all.properties);
        let count = properties.len();

        Ok(PropertyCollection {
            properties,
            count,
            message: format!("{} of {} properties match", count, total),
        })
    }

    /// Drops every cached entry; returns how many were removed.
    pub async fn clear_cache(&self) -> Result<usize> {
        self.cache.clear().await
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Capacity evictions in the backing store, when it tracks them.
    pub async fn store_evictions(&self) -> Option<u64> {
        self.cache.store_evictions().await
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Releases the store connection.
    pub async fn close(&self) {
        self.cache.close().await;
        info!("Buildout service closed");
    }
}
