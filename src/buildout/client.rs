//! Buildout HTTP Client
//!
//! reqwest-backed implementation of [`PropertySource`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::buildout::{PageQuery, PropertySource};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::upstream::{BrokersEnvelope, PropertiesEnvelope};
use crate::models::{Broker, Page, UpstreamProperty};

/// HTTP client for the Buildout REST API.
#[derive(Debug, Clone)]
pub struct BuildoutClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BuildoutClient {
    /// Creates a client from configuration.
    ///
    /// A missing API key is accepted here; every fetch then fails instead.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout))
            .user_agent(concat!("buildout-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, resource: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ApiError::Upstream("BUILDOUT_API_KEY is not configured".to_string())
        })?;
        Ok(format!("{}/{}/{}.json", self.base_url, api_key, resource))
    }

    async fn get_page<E: DeserializeOwned>(&self, resource: &str, query: PageQuery) -> Result<E> {
        let url = self.endpoint(resource)?;
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(broker_id) = query.broker_id {
            params.push(("broker_id", broker_id.to_string()));
        }

        debug!(
            "Fetching {} page: limit={}, offset={}, broker_id={:?}",
            resource, query.limit, query.offset, query.broker_id
        );

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(resource, status));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Upstream(format!("invalid {} response: {}", resource, e))
        })
    }
}

fn status_error(resource: &str, status: StatusCode) -> ApiError {
    ApiError::Upstream(format!(
        "{} request failed with status {}",
        resource, status
    ))
}

#[async_trait]
impl PropertySource for BuildoutClient {
    async fn fetch_properties_page(&self, query: PageQuery) -> Result<Page<UpstreamProperty>> {
        let envelope: PropertiesEnvelope = self.get_page("properties", query).await?;
        Ok(envelope.into())
    }

    async fn fetch_brokers_page(&self, query: PageQuery) -> Result<Page<Broker>> {
        let query = PageQuery {
            broker_id: None,
            ..query
        };
        let envelope: BrokersEnvelope = self.get_page("brokers", query).await?;
        Ok(envelope.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{
        extract::{Path, Query},
        http::StatusCode as AxumStatus,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};

    // Serves `/v1/:key/:resource` like the upstream, paging over 3 properties.
    async fn spawn_upstream() -> String {
        async fn handler(
            Path((key, resource)): Path<(String, String)>,
            Query(params): Query<HashMap<String, String>>,
        ) -> (AxumStatus, Json<Value>) {
            if key != "secret" {
                return (AxumStatus::UNAUTHORIZED, Json(json!({"message": "bad key"})));
            }
            let limit: usize = params["limit"].parse().unwrap();
            let offset: usize = params["offset"].parse().unwrap();
            let broker_id: u64 = params
                .get("broker_id")
                .map(|b| b.parse().unwrap())
                .unwrap_or(1);
            match resource.as_str() {
                "properties.json" => {
                    let all: Vec<Value> = (1..=3)
                        .map(|id| json!({"id": id, "city": "Tampa", "broker_ids": [broker_id]}))
                        .collect();
                    let page: Vec<Value> = all.into_iter().skip(offset).take(limit).collect();
                    (
                        AxumStatus::OK,
                        Json(json!({"properties": page, "count": 3, "message": "ok"})),
                    )
                }
                "brokers.json" => (
                    AxumStatus::OK,
                    Json(json!({"brokers": [{"id": 5, "email": "a@b.com"}], "count": 1})),
                ),
                _ => (AxumStatus::NOT_FOUND, Json(json!({"message": "unknown"}))),
            }
        }

        let app = Router::new().route("/v1/:key/:resource", get(handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn client(base_url: String, api_key: Option<&str>) -> BuildoutClient {
        let config = Config {
            base_url,
            api_key: api_key.map(str::to_string),
            upstream_timeout: 5,
            ..Config::default()
        };
        BuildoutClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_properties_page() {
        let base = spawn_upstream().await;
        let client = client(base, Some("secret"));

        let page = client
            .fetch_properties_page(PageQuery {
                limit: 2,
                offset: 0,
                broker_id: Some(9),
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.count, Some(3));
        assert_eq!(page.message.as_deref(), Some("ok"));
        assert_eq!(page.items[0].broker_ids, vec![9]);
    }

    #[tokio::test]
    async fn test_fetch_brokers_page() {
        let base = spawn_upstream().await;
        let client = client(base, Some("secret"));

        let page = client
            .fetch_brokers_page(PageQuery {
                limit: 10,
                offset: 0,
                broker_id: None,
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.items[0].has_email("A@B.com"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let base = spawn_upstream().await;
        let client = client(base, Some("wrong"));

        let err = client
            .fetch_properties_page(PageQuery {
                limit: 2,
                offset: 0,
                broker_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fetch() {
        let client = client("http://127.0.0.1:1/v1".to_string(), None);
        let err = client
            .fetch_properties_page(PageQuery {
                limit: 2,
                offset: 0,
                broker_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream(msg) if msg.contains("BUILDOUT_API_KEY")));
    }
}
