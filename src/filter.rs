//! Property Filter Module
//!
//! In-memory predicate evaluation over an already fetched property collection.
//! Every supplied criterion must hold; absent criteria are ignored.

use std::str::FromStr;

use crate::error::ApiError;
use crate::models::{property_type_label, UpstreamProperty};

/// Sale-versus-lease criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Sale,
    Lease,
}

impl FromStr for Listing {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "for-sale" | "forsale" => Ok(Listing::Sale),
            "lease" | "for-lease" | "forlease" => Ok(Listing::Lease),
            other => Err(ApiError::InvalidRequest(format!(
                "listing must be 'sale' or 'lease', got '{}'",
                other
            ))),
        }
    }
}

/// Property type criterion: an upstream type id or a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyTypeCriterion {
    Id(u32),
    Label(String),
}

impl PropertyTypeCriterion {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<u32>() {
            Ok(id) => PropertyTypeCriterion::Id(id),
            Err(_) => PropertyTypeCriterion::Label(raw.to_ascii_lowercase()),
        }
    }

    fn matches(&self, type_id: Option<u32>) -> bool {
        match (self, type_id) {
            (PropertyTypeCriterion::Id(wanted), Some(id)) => *wanted == id,
            (PropertyTypeCriterion::Label(wanted), Some(id)) => {
                property_type_label(id).eq_ignore_ascii_case(wanted)
            }
            (_, None) => false,
        }
    }
}

/// Optional search criteria combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyFilter {
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_size: Option<f64>,
    pub max_size: Option<f64>,
    pub property_type: Option<PropertyTypeCriterion>,
    pub listing: Option<Listing>,
    pub min_cap_rate: Option<f64>,
    pub max_cap_rate: Option<f64>,
}

impl PropertyFilter {
    /// True when no criterion is supplied.
    pub fn is_empty(&self) -> bool {
        *self == PropertyFilter::default()
    }

    /// Returns true if the property satisfies every supplied criterion.
    pub fn matches(&self, property: &UpstreamProperty) -> bool {
        self.matches_search(property)
            && in_range(property.price(), self.min_price, self.max_price)
            && in_range(property.building_size_sf, self.min_size, self.max_size)
            && in_range(property.cap_rate_pct, self.min_cap_rate, self.max_cap_rate)
            && self
                .property_type
                .as_ref()
                .map_or(true, |criterion| criterion.matches(property.property_type_id))
            && match self.listing {
                None => true,
                Some(Listing::Sale) => property.sale,
                Some(Listing::Lease) => property.lease,
            }
    }

    /// Returns the matching subset, preserving order.
    pub fn apply(&self, properties: &[UpstreamProperty]) -> Vec<UpstreamProperty> {
        if self.is_empty() {
            return properties.to_vec();
        }
        properties
            .iter()
            .filter(|property| self.matches(property))
            .cloned()
            .collect()
    }

    fn matches_search(&self, property: &UpstreamProperty) -> bool {
        let Some(needle) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();

        [
            &property.address,
            &property.city,
            &property.state,
            &property.zip,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Inclusive range check; a missing value fails any supplied bound.
fn in_range(value: Option<f64>, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn property(id: u64, city: &str, price: Option<f64>) -> UpstreamProperty {
        UpstreamProperty {
            id,
            address: Some(format!("{} Commerce Blvd", id)),
            city: Some(city.to_string()),
            state: Some("FL".to_string()),
            zip: Some(format!("336{:02}", id)),
            sale_price_dollars: price,
            ..Default::default()
        }
    }

    fn sample() -> Vec<UpstreamProperty> {
        vec![
            UpstreamProperty {
                building_size_sf: Some(5_000.0),
                property_type_id: Some(1),
                sale: true,
                cap_rate_pct: Some(6.5),
                ..property(1, "Tampa", Some(250_000.0))
            },
            UpstreamProperty {
                building_size_sf: Some(20_000.0),
                property_type_id: Some(3),
                lease: true,
                cap_rate_pct: Some(8.0),
                ..property(2, "Orlando", Some(900_000.0))
            },
            UpstreamProperty {
                property_type_id: Some(2),
                sale: true,
                lease: true,
                ..property(3, "St. Petersburg", None)
            },
        ]
    }

    fn ids(properties: &[UpstreamProperty]) -> Vec<u64> {
        properties.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let filter = PropertyFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(&sample())), vec![1, 2, 3]);
    }

    #[test]
    fn test_price_range_inclusive() {
        let filter = PropertyFilter {
            min_price: Some(250_000.0),
            max_price: Some(900_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![1, 2]);

        let upper_only = PropertyFilter {
            max_price: Some(250_000.0),
            ..Default::default()
        };
        assert_eq!(ids(&upper_only.apply(&sample())), vec![1]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = PropertyFilter {
            search: Some("ORLANDO".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec![2]);

        let by_zip = PropertyFilter {
            search: Some("33603".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_zip.apply(&sample())), vec![3]);

        let by_state = PropertyFilter {
            search: Some("fl".into()),
            ..Default::default()
        };
        assert_eq!(ids(&by_state.apply(&sample())), vec![1, 2, 3]);
    }

    #[test]
    fn test_blank_search_is_noop() {
        let filter = PropertyFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&sample()).len(), 3);
    }

    #[test]
    fn test_property_type_by_id_and_label() {
        let by_id = PropertyFilter {
            property_type: Some(PropertyTypeCriterion::parse("3")),
            ..Default::default()
        };
        assert_eq!(ids(&by_id.apply(&sample())), vec![2]);

        let by_label = PropertyFilter {
            property_type: Some(PropertyTypeCriterion::parse("Retail")),
            ..Default::default()
        };
        assert_eq!(ids(&by_label.apply(&sample())), vec![3]);
    }

    #[test]
    fn test_listing_and_ranges_combine() {
        let filter = PropertyFilter {
            listing: Some(Listing::Sale),
            min_size: Some(1_000.0),
            ..Default::default()
        };
        // Property 3 is for sale but has no size
        assert_eq!(ids(&filter.apply(&sample())), vec![1]);

        let cap = PropertyFilter {
            min_cap_rate: Some(7.0),
            max_cap_rate: Some(9.0),
            ..Default::default()
        };
        assert_eq!(ids(&cap.apply(&sample())), vec![2]);
    }

    #[test]
    fn test_listing_parse() {
        assert_eq!("Sale".parse::<Listing>().unwrap(), Listing::Sale);
        assert_eq!("for-lease".parse::<Listing>().unwrap(), Listing::Lease);
        assert!("rent".parse::<Listing>().is_err());
    }

    proptest! {
        #[test]
        fn prop_price_range_selects_exact_subset(
            prices in prop::collection::vec(prop::option::of(0u32..2_000_000), 0..40),
            a in 0u32..2_000_000,
            b in 0u32..2_000_000,
        ) {
            let (min, max) = (a.min(b) as f64, a.max(b) as f64);
            let properties: Vec<UpstreamProperty> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| property(i as u64, "Tampa", p.map(f64::from)))
                .collect();

            let filter = PropertyFilter {
                min_price: Some(min),
                max_price: Some(max),
                ..Default::default()
            };
            let selected = ids(&filter.apply(&properties));
            let expected: Vec<u64> = properties
                .iter()
                .filter(|p| p.price().is_some_and(|v| v >= min && v <= max))
                .map(|p| p.id)
                .collect();
            prop_assert_eq!(selected, expected);
        }

        #[test]
        fn prop_filter_result_is_subset(search in "[a-zA-Z ]{0,8}") {
            let filter = PropertyFilter {
                search: Some(search),
                ..Default::default()
            };
            let all = sample();
            let selected = filter.apply(&all);
            prop_assert!(selected.len() <= all.len());
            for p in &selected {
                prop_assert!(filter.matches(p));
            }
        }
    }
}
