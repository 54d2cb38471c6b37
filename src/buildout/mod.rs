//! Buildout Module
//!
//! Paginated access to the upstream property-data API.
//!
//! # Components
//! - `PropertySource` - one-page fetch seam, substituted by fakes in tests
//! - `BuildoutClient` - reqwest implementation of `PropertySource`
//! - `fetch_all_properties` / `fetch_all_brokers` - page aggregation

mod client;
mod pagination;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Broker, Page, UpstreamProperty};

pub use client::BuildoutClient;
pub use pagination::{fetch_all_brokers, fetch_all_properties, MAX_ITEMS};

/// Largest page size accepted from callers.
pub const MAX_PAGE_LIMIT: u32 = 1000;

/// Parameters of a single upstream page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub offset: u64,
    pub broker_id: Option<u64>,
}

/// Source of upstream pages.
#[async_trait]
pub trait PropertySource: Send + Sync {
    /// Fetches one page of properties.
    async fn fetch_properties_page(&self, query: PageQuery) -> Result<Page<UpstreamProperty>>;

    /// Fetches one page of brokers. `broker_id` is ignored.
    async fn fetch_brokers_page(&self, query: PageQuery) -> Result<Page<Broker>>;
}
