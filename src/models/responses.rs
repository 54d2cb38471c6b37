//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::{to_lightweight, Broker, LightweightProperty, UpstreamProperty};

/// Properties in either the full upstream shape or the lightweight projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyList {
    Full(Vec<UpstreamProperty>),
    Lightweight(Vec<LightweightProperty>),
}

impl PropertyList {
    /// Full records when `full_data`, otherwise the lightweight projection.
    pub fn select(properties: Vec<UpstreamProperty>, full_data: bool) -> Self {
        if full_data {
            PropertyList::Full(properties)
        } else {
            PropertyList::Lightweight(to_lightweight(&properties))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PropertyList::Full(items) => items.len(),
            PropertyList::Lightweight(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Response body for property listings
#[derive(Debug, Clone, Serialize)]
pub struct PropertiesResponse {
    pub success: bool,
    pub properties: PropertyList,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PropertiesResponse {
    pub fn new(properties: PropertyList, count: usize, message: Option<String>) -> Self {
        Self {
            success: true,
            properties,
            count,
            message,
        }
    }
}

/// Response body for `GET /api/buildout/brokers`
#[derive(Debug, Clone, Serialize)]
pub struct BrokersResponse {
    pub success: bool,
    pub brokers: Vec<Broker>,
    pub count: usize,
}

impl BrokersResponse {
    pub fn new(brokers: Vec<Broker>) -> Self {
        Self {
            success: true,
            count: brokers.len(),
            brokers,
        }
    }
}

/// Response body for `POST /api/buildout/validate-broker-email`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerEmailResponse {
    pub success: bool,
    pub broker_id: u64,
    pub email: String,
}

impl BrokerEmailResponse {
    pub fn new(broker_id: u64, email: impl Into<String>) -> Self {
        Self {
            success: true,
            broker_id,
            email: email.into(),
        }
    }
}

/// Response body for `POST /api/buildout/clear-cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub success: bool,
    pub message: String,
}

impl ClearCacheResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            success: true,
            message: format!("Cache cleared ({} entries removed)", removed),
        }
    }
}

/// Response body for `GET /api/buildout/cache-stats`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub success: bool,
    pub backend: String,
    pub hits: u64,
    pub misses: u64,
    pub bypasses: u64,
    pub coalesced: u64,
    pub fallbacks: u64,
    pub upstream_fetches: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Capacity evictions, for stores that track them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evictions: Option<u64>,
}

impl CacheStatsResponse {
    pub fn new(backend: &str, stats: CacheStats, evictions: Option<u64>) -> Self {
        Self {
            success: true,
            backend: backend.to_string(),
            hits: stats.hits,
            misses: stats.misses,
            bypasses: stats.bypasses,
            coalesced: stats.coalesced,
            fallbacks: stats.fallbacks,
            upstream_fetches: stats.upstream_fetches,
            hit_rate: stats.hit_rate(),
            evictions,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Active cache backend
    pub cache_backend: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache_backend: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache_backend: cache_backend.to_string(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
