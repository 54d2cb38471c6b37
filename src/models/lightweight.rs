//! Lightweight property projection for list and card views.

use serde::{Deserialize, Serialize};

use crate::models::UpstreamProperty;

/// Minimal property shape needed by list UIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightweightProperty {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<f64>,
    pub size_sf: Option<f64>,
    pub property_type: Option<String>,
    pub for_sale: bool,
    pub for_lease: bool,
    pub primary_image: Option<String>,
    pub broker_id: Option<u64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&UpstreamProperty> for LightweightProperty {
    fn from(property: &UpstreamProperty) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();

        Self {
            id: property.id,
            name: text(&property.name),
            address: text(&property.address),
            city: text(&property.city),
            state: text(&property.state),
            zip: text(&property.zip),
            price: property.price(),
            size_sf: property.building_size_sf,
            property_type: property.property_type().map(str::to_string),
            for_sale: property.sale,
            for_lease: property.lease,
            primary_image: property.primary_image().map(str::to_string),
            broker_id: property.broker_ids.first().copied(),
            latitude: property.latitude,
            longitude: property.longitude,
        }
    }
}

/// Projects a collection, preserving order.
pub fn to_lightweight(properties: &[UpstreamProperty]) -> Vec<LightweightProperty> {
    properties.iter().map(LightweightProperty::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::upstream::Photo;

    #[test]
    fn test_transform_full_record() {
        let property = UpstreamProperty {
            id: 11,
            name: Some("Harbor Plaza".into()),
            address: Some("100 Harbor Way".into()),
            city: Some("Tampa".into()),
            state: Some("FL".into()),
            zip: Some("33602".into()),
            sale_price_dollars: Some(1_250_000.0),
            building_size_sf: Some(12_000.0),
            property_type_id: Some(2),
            sale: true,
            broker_ids: vec![9, 4],
            photos: vec![Photo {
                url: Some("https://img/harbor.jpg".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let light = LightweightProperty::from(&property);
        assert_eq!(light.id, 11);
        assert_eq!(light.city, "Tampa");
        assert_eq!(light.price, Some(1_250_000.0));
        assert_eq!(light.property_type.as_deref(), Some("Retail"));
        assert!(light.for_sale);
        assert!(!light.for_lease);
        assert_eq!(light.primary_image.as_deref(), Some("https://img/harbor.jpg"));
        assert_eq!(light.broker_id, Some(9));
    }

    #[test]
    fn test_transform_missing_fields_default() {
        let property = UpstreamProperty {
            id: 1,
            ..Default::default()
        };

        let light = LightweightProperty::from(&property);
        assert_eq!(light.address, "");
        assert_eq!(light.zip, "");
        assert!(light.price.is_none());
        assert!(light.property_type.is_none());
        assert!(light.primary_image.is_none());
        assert!(light.broker_id.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let light = LightweightProperty::from(&UpstreamProperty {
            id: 2,
            ..Default::default()
        });
        let json = serde_json::to_value(&light).unwrap();
        assert!(json.get("sizeSf").is_some());
        assert!(json.get("primaryImage").is_some());
        assert!(json.get("brokerId").is_some());
    }
}
