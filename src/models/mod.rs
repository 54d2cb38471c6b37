//! Data models for the gateway
//!
//! Upstream record types, the lightweight list projection, and the DTOs used
//! for serializing/deserializing HTTP request and response bodies.

pub mod lightweight;
pub mod requests;
pub mod responses;
pub mod upstream;

// Re-export commonly used types
pub use lightweight::{to_lightweight, LightweightProperty};
pub use requests::{
    AllPropertiesQuery, BrokerPropertiesQuery, BrokersQuery, SearchQuery, ValidateEmailRequest,
};
pub use responses::{
    BrokerEmailResponse, BrokersResponse, CacheStatsResponse, ClearCacheResponse, ErrorResponse,
    HealthResponse, PropertiesResponse, PropertyList,
};
pub use upstream::{
    property_type_label, Broker, BrokerCollection, Page, PropertyCollection, UpstreamProperty,
};
