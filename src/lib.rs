//! Buildout Gateway - cached HTTP access to Buildout property data
//!
//! Aggregates paginated upstream listings, caches them read-through in an
//! optional key-value store and serves filtered views over them.

pub mod api;
pub mod buildout;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::{create_router, AppState};
pub use buildout::BuildoutClient;
pub use config::Config;
pub use service::BuildoutService;
pub use tasks::spawn_cleanup_task;
