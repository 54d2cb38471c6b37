//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /api/buildout/all-properties` - Every property, lightweight unless `fullData`
//! - `GET /api/buildout/brokers` - Every broker
//! - `GET /api/buildout/properties-by-broker-id` - One broker's properties, windowed
//! - `GET /api/buildout/search-properties` - Properties matching a filter
//! - `POST /api/buildout/validate-broker-email` - Resolve an email to a broker id
//! - `POST /api/buildout/clear-cache` - Drop every cached entry
//! - `GET /api/buildout/cache-stats` - Cache counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
