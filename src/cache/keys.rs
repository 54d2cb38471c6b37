//! Cache key derivation.

use std::fmt;

/// Logical query shapes that own a cache entry.
///
/// Page size is deliberately absent: every page size yields the same
/// aggregated collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Every property
    AllProperties,
    /// Properties associated with one broker
    BrokerProperties(u64),
    /// Broker id resolved from an email
    BrokerEmail(String),
    /// Every broker
    Brokers,
}

impl CacheKey {
    /// Key for an email lookup; the email is normalized first.
    pub fn broker_email(email: &str) -> Self {
        CacheKey::BrokerEmail(email.trim().to_ascii_lowercase())
    }

    /// Full store key under `prefix`.
    pub fn namespaced(&self, prefix: &str) -> String {
        format!("{}:{}", prefix, self)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllProperties => f.write_str("all-properties"),
            CacheKey::BrokerProperties(id) => write!(f, "broker:{}", id),
            CacheKey::BrokerEmail(email) => write!(f, "broker-email:{}", email),
            CacheKey::Brokers => f.write_str("brokers"),
        }
    }
}
