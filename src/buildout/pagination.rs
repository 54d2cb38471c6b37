//! Page Aggregation
//!
//! Walks the upstream `limit`/`offset` contract until the listing is
//! exhausted and concatenates every page into one collection.

use std::future::Future;

use tracing::debug;

use crate::buildout::{PageQuery, PropertySource};
use crate::error::{ApiError, Result};
use crate::models::{BrokerCollection, Page, PropertyCollection};

/// Upper bound on items gathered by one aggregation.
pub const MAX_ITEMS: u64 = 100_000;

/// Fetches every property, optionally restricted to one broker.
pub async fn fetch_all_properties(
    source: &dyn PropertySource,
    limit: u32,
    broker_id: Option<u64>,
) -> Result<PropertyCollection> {
    let (properties, message) = collect_pages(limit, move |offset| {
        source.fetch_properties_page(PageQuery {
            limit,
            offset,
            broker_id,
        })
    })
    .await?;

    let count = properties.len();
    let message = message.unwrap_or_else(|| format!("Fetched {} properties", count));
    Ok(PropertyCollection {
        properties,
        count,
        message,
    })
}

/// Fetches every broker.
pub async fn fetch_all_brokers(source: &dyn PropertySource, limit: u32) -> Result<BrokerCollection> {
    let (brokers, _) = collect_pages(limit, move |offset| {
        source.fetch_brokers_page(PageQuery {
            limit,
            offset,
            broker_id: None,
        })
    })
    .await?;

    let count = brokers.len();
    Ok(BrokerCollection { brokers, count })
}

/// Requests pages sequentially until a short page, an empty page, or the
/// reported total is reached. Any page failure aborts the whole walk.
async fn collect_pages<T, F, Fut>(limit: u32, mut fetch_page: F) -> Result<(Vec<T>, Option<String>)>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    if limit == 0 {
        return Err(ApiError::InvalidRequest("limit must be positive".to_string()));
    }

    let mut items = Vec::new();
    let mut message = None;
    let mut offset: u64 = 0;
    let mut reported_total = None;
    let mut page_number: u64 = 0;

    loop {
        let page = fetch_page(offset).await?;
        let received = page.items.len();
        debug!(
            "Received page {} ({} items, offset {}, reported total {:?})",
            page_number, received, offset, page.count
        );

        items.extend(page.items);
        if page.message.is_some() {
            message = page.message;
        }
        reported_total = page.count.or(reported_total);

        let reached_total = reported_total.is_some_and(|total| items.len() as u64 >= total);
        if received == 0 || received < limit as usize || reached_total {
            return Ok((items, message));
        }
        offset += received as u64;
        page_number += 1;

        let ceiling = page_ceiling(limit, reported_total);
        if page_number >= ceiling {
            return Err(ApiError::Upstream(format!(
                "pagination did not terminate after {} pages",
                page_number
            )));
        }
    }
}

/// Pages a walk may request: enough for the reported total (bounded by
/// `MAX_ITEMS`) plus one, or `MAX_ITEMS` worth when no total is reported.
fn page_ceiling(limit: u32, reported_total: Option<u64>) -> u64 {
    let limit = u64::from(limit);
    match reported_total {
        Some(total) => total.min(MAX_ITEMS).div_ceil(limit) + 1,
        None => MAX_ITEMS.div_ceil(limit),
    }
}
