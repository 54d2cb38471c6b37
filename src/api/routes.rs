//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_properties_handler, brokers_handler, cache_stats_handler, clear_cache_handler,
    health_handler, properties_by_broker_handler, search_properties_handler,
    validate_broker_email_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let buildout = Router::new()
        .route("/all-properties", get(all_properties_handler))
        .route("/brokers", get(brokers_handler))
        .route("/properties-by-broker-id", get(properties_by_broker_handler))
        .route("/search-properties", get(search_properties_handler))
        .route("/validate-broker-email", post(validate_broker_email_handler))
        .route("/clear-cache", post(clear_cache_handler))
        .route("/cache-stats", get(cache_stats_handler));

    Router::new()
        .nest("/api/buildout", buildout)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
