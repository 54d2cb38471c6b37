//! Upstream record types
//!
//! Shapes returned by the Buildout API. Fields this gateway reads are typed;
//! everything else is kept verbatim so full-data responses echo the upstream
//! record unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A photo attached to an upstream property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full property record as received from the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamProperty {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub zip: Option<String>,
    #[serde(default)]
    pub sale_price_dollars: Option<f64>,
    #[serde(default)]
    pub lease_rate: Option<f64>,
    #[serde(default)]
    pub building_size_sf: Option<f64>,
    #[serde(default)]
    pub property_type_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sale: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lease: bool,
    #[serde(default)]
    pub cap_rate_pct: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub broker_ids: Vec<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Upstream fields this gateway does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpstreamProperty {
    /// Sale price when listed, otherwise the lease rate.
    pub fn price(&self) -> Option<f64> {
        self.sale_price_dollars.or(self.lease_rate)
    }

    /// Human-readable property type label.
    pub fn property_type(&self) -> Option<&'static str> {
        self.property_type_id.map(property_type_label)
    }

    /// URL of the first photo, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.photos.iter().find_map(|photo| photo.url.as_deref())
    }
}

/// Maps an upstream property type id to its label.
pub fn property_type_label(id: u32) -> &'static str {
    match id {
        1 => "Office",
        2 => "Retail",
        3 => "Industrial",
        5 => "Land",
        6 => "Multifamily",
        7 => "Special Purpose",
        8 => "Hospitality",
        _ => "Other",
    }
}

/// Broker record as received from the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Broker {
    /// Case-insensitive email comparison, ignoring surrounding whitespace.
    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.trim().eq_ignore_ascii_case(email.trim()))
    }
}

/// Treats an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string or a bare scalar (e.g. a numeric zip); empty strings
/// and anything non-scalar become `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

/// One page of an upstream listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total reported by the upstream, when it reports one
    pub count: Option<u64>,
    pub message: Option<String>,
}

/// Wire envelope of `properties.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct PropertiesEnvelope {
    #[serde(default)]
    pub properties: Vec<UpstreamProperty>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<PropertiesEnvelope> for Page<UpstreamProperty> {
    fn from(envelope: PropertiesEnvelope) -> Self {
        Page {
            items: envelope.properties,
            count: envelope.count,
            message: envelope.message,
        }
    }
}

/// Wire envelope of `brokers.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct BrokersEnvelope {
    #[serde(default)]
    pub brokers: Vec<Broker>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<BrokersEnvelope> for Page<Broker> {
    fn from(envelope: BrokersEnvelope) -> Self {
        Page {
            items: envelope.brokers,
            count: envelope.count,
            message: envelope.message,
        }
    }
}

/// Every property the upstream holds for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCollection {
    pub properties: Vec<UpstreamProperty>,
    pub count: usize,
    pub message: String,
}

/// Every broker the upstream holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerCollection {
    pub brokers: Vec<Broker>,
    pub count: usize,
}
