//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::models::{
    AllPropertiesQuery, BrokerEmailResponse, BrokerPropertiesQuery, BrokersQuery, BrokersResponse,
    CacheStatsResponse, ClearCacheResponse, HealthResponse, PropertiesResponse, PropertyList,
    SearchQuery, ValidateEmailRequest,
};
use crate::service::BuildoutService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cached upstream access
    pub service: Arc<BuildoutService>,
    /// Page size used when a request omits `limit`
    pub default_page_limit: u32,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: BuildoutService, default_page_limit: u32) -> Self {
        Self {
            service: Arc::new(service),
            default_page_limit,
        }
    }
}

/// Handler for GET /api/buildout/all-properties
pub async fn all_properties_handler(
    State(state): State<AppState>,
    Query(query): Query<AllPropertiesQuery>,
) -> Result<Json<PropertiesResponse>> {
    let params = query.validate(state.default_page_limit)?;

    let collection = state
        .service
        .all_properties(params.limit, params.broker_id, params.skip_cache)
        .await?;

    Ok(Json(PropertiesResponse::new(
        PropertyList::select(collection.properties, params.full_data),
        collection.count,
        Some(collection.message),
    )))
}

/// Handler for GET /api/buildout/brokers
pub async fn brokers_handler(
    State(state): State<AppState>,
    Query(query): Query<BrokersQuery>,
) -> Result<Json<BrokersResponse>> {
    let (limit, skip_cache) = query.validate(state.default_page_limit)?;
    let collection = state.service.brokers(limit, skip_cache).await?;

    Ok(Json(BrokersResponse::new(collection.brokers)))
}

/// Handler for GET /api/buildout/properties-by-broker-id
///
/// `count` is the broker's total; `properties` is the requested window.
pub async fn properties_by_broker_handler(
    State(state): State<AppState>,
    Query(query): Query<BrokerPropertiesQuery>,
) -> Result<Json<PropertiesResponse>> {
    let params = query.validate(state.default_page_limit)?;

    let collection = state
        .service
        .properties_by_broker(params.broker_id, params.limit, params.skip_cache)
        .await?;

    let window = collection
        .properties
        .into_iter()
        .skip(params.offset)
        .take(params.limit as usize)
        .collect();

    Ok(Json(PropertiesResponse::new(
        PropertyList::Full(window),
        collection.count,
        None,
    )))
}

/// Handler for GET /api/buildout/search-properties
pub async fn search_properties_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PropertiesResponse>> {
    let (filter, params) = query.validate(state.default_page_limit)?;

    let collection = state
        .service
        .search_properties(&filter, params.limit, params.skip_cache)
        .await?;

    Ok(Json(PropertiesResponse::new(
        PropertyList::select(collection.properties, params.full_data),
        collection.count,
        Some(collection.message),
    )))
}

/// Handler for POST /api/buildout/validate-broker-email
pub async fn validate_broker_email_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ValidateEmailRequest>, JsonRejection>,
) -> Result<Json<BrokerEmailResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::InvalidRequest(format!("invalid request body: {}", rejection.body_text()))
    })?;
    let email = request.validate()?;

    let broker_id = state.service.broker_id_for_email(&email, false).await?;

    Ok(Json(BrokerEmailResponse::new(broker_id, email)))
}

/// Handler for POST /api/buildout/clear-cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Result<Json<ClearCacheResponse>> {
    let removed = state.service.clear_cache().await?;
    info!("Cache cleared on request, {} entries removed", removed);

    Ok(Json(ClearCacheResponse::new(removed)))
}

/// Handler for GET /api/buildout/cache-stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse::new(
        state.service.cache_backend(),
        state.service.stats(),
        state.service.store_evictions().await,
    ))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.cache_backend()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::buildout::{PageQuery, PropertySource};
    use crate::cache::{KvStore, MemoryStore, ReadThroughCache};
    use crate::models::{Broker, Page, UpstreamProperty};

    struct TinySource;

    #[async_trait]
    impl PropertySource for TinySource {
        async fn fetch_properties_page(&self, query: PageQuery) -> Result<Page<UpstreamProperty>> {
            let items = (1..=3u64)
                .filter(|_| query.offset == 0)
                .map(|id| UpstreamProperty {
                    id,
                    broker_ids: vec![query.broker_id.unwrap_or(1)],
                    ..Default::default()
                })
                .collect();
            Ok(Page {
                items,
                count: Some(3),
                message: Some("ok".to_string()),
            })
        }

        async fn fetch_brokers_page(&self, _query: PageQuery) -> Result<Page<Broker>> {
            Ok(Page {
                items: vec![Broker {
                    id: 8,
                    email: Some("lee@firm.com".to_string()),
                    ..Default::default()
                }],
                count: Some(1),
                message: None,
            })
        }
    }

    fn state() -> AppState {
        state_with_capacity(10)
    }

    fn state_with_capacity(capacity: usize) -> AppState {
        let store: Arc<dyn KvStore> = MemoryStore::shared(capacity);
        let cache = ReadThroughCache::new(Some(store), "buildout", Duration::from_secs(60));
        AppState::new(BuildoutService::new(Arc::new(TinySource), cache, 10), 10)
    }

    #[tokio::test]
    async fn test_all_properties_handler_lightweight_by_default() {
        let response = all_properties_handler(State(state()), Query(AllPropertiesQuery::default()))
            .await
            .unwrap();
        assert_eq!(response.count, 3);
        assert!(matches!(response.properties, PropertyList::Lightweight(_)));
    }

    #[tokio::test]
    async fn test_properties_by_broker_window() {
        let query = BrokerPropertiesQuery {
            broker_id: Some("5".to_string()),
            limit: Some("10".to_string()),
            offset: Some("1".to_string()),
            skip_cache: None,
        };
        let response = properties_by_broker_handler(State(state()), Query(query))
            .await
            .unwrap();
        assert_eq!(response.count, 3);
        assert_eq!(response.properties.len(), 2);
    }

    #[tokio::test]
    async fn test_properties_by_broker_requires_id() {
        let result =
            properties_by_broker_handler(State(state()), Query(BrokerPropertiesQuery::default()))
                .await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_validate_email_handler() {
        let request = ValidateEmailRequest {
            email: Some("LEE@firm.com".to_string()),
        };
        let response = validate_broker_email_handler(State(state()), Ok(Json(request)))
            .await
            .unwrap();
        assert_eq!(response.broker_id, 8);
        assert_eq!(response.email, "lee@firm.com");
    }

    #[tokio::test]
    async fn test_clear_cache_handler() {
        let response = clear_cache_handler(State(state())).await.unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_cache_stats_reports_evictions() {
        let state = state_with_capacity(1);
        all_properties_handler(State(state.clone()), Query(AllPropertiesQuery::default()))
            .await
            .unwrap();
        brokers_handler(State(state.clone()), Query(BrokersQuery::default()))
            .await
            .unwrap();

        let response = cache_stats_handler(State(state)).await;
        assert_eq!(response.misses, 2);
        assert_eq!(response.evictions, Some(1));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler(State(state())).await;
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cache_backend, "memory");
    }
}
