//! Request DTOs for the gateway API
//!
//! Query strings arrive as raw strings and are validated here so that every
//! malformed parameter maps to a 400 with a readable message.

use serde::Deserialize;

use crate::buildout::MAX_PAGE_LIMIT;
use crate::error::{ApiError, Result};
use crate::filter::{Listing, PropertyFilter, PropertyTypeCriterion};

/// Query for `GET /api/buildout/all-properties`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllPropertiesQuery {
    pub limit: Option<String>,
    pub broker_id: Option<String>,
    pub skip_cache: Option<String>,
    pub full_data: Option<String>,
}

/// Validated form of [`AllPropertiesQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct AllPropertiesParams {
    pub limit: u32,
    pub broker_id: Option<u64>,
    pub skip_cache: bool,
    pub full_data: bool,
}

impl AllPropertiesQuery {
    pub fn validate(&self, default_limit: u32) -> Result<AllPropertiesParams> {
        Ok(AllPropertiesParams {
            limit: parse_limit(self.limit.as_deref(), default_limit)?,
            broker_id: match self.broker_id.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(parse_broker_id(Some(raw))?),
            },
            skip_cache: parse_flag("skipCache", self.skip_cache.as_deref())?,
            full_data: parse_flag("fullData", self.full_data.as_deref())?,
        })
    }
}

/// Query for `GET /api/buildout/brokers`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokersQuery {
    pub limit: Option<String>,
    pub skip_cache: Option<String>,
}

impl BrokersQuery {
    /// Returns `(limit, skip_cache)`.
    pub fn validate(&self, default_limit: u32) -> Result<(u32, bool)> {
        Ok((
            parse_limit(self.limit.as_deref(), default_limit)?,
            parse_flag("skipCache", self.skip_cache.as_deref())?,
        ))
    }
}

/// Query for `GET /api/buildout/properties-by-broker-id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerPropertiesQuery {
    pub broker_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub skip_cache: Option<String>,
}

/// Validated form of [`BrokerPropertiesQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerPropertiesParams {
    pub broker_id: u64,
    pub limit: u32,
    pub offset: usize,
    pub skip_cache: bool,
}

impl BrokerPropertiesQuery {
    pub fn validate(&self, default_limit: u32) -> Result<BrokerPropertiesParams> {
        Ok(BrokerPropertiesParams {
            broker_id: parse_broker_id(self.broker_id.as_deref())?,
            limit: parse_limit(self.limit.as_deref(), default_limit)?,
            offset: parse_number("offset", self.offset.as_deref())?.unwrap_or(0),
            skip_cache: parse_flag("skipCache", self.skip_cache.as_deref())?,
        })
    }
}

/// Query for `GET /api/buildout/search-properties`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_size: Option<String>,
    pub max_size: Option<String>,
    pub property_type: Option<String>,
    pub listing: Option<String>,
    pub min_cap_rate: Option<String>,
    pub max_cap_rate: Option<String>,
    pub limit: Option<String>,
    pub skip_cache: Option<String>,
    pub full_data: Option<String>,
}

impl SearchQuery {
    /// Returns the filter plus the listing parameters shared with all-properties.
    pub fn validate(&self, default_limit: u32) -> Result<(PropertyFilter, AllPropertiesParams)> {
        let filter = PropertyFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            min_price: parse_number("minPrice", self.min_price.as_deref())?,
            max_price: parse_number("maxPrice", self.max_price.as_deref())?,
            min_size: parse_number("minSize", self.min_size.as_deref())?,
            max_size: parse_number("maxSize", self.max_size.as_deref())?,
            property_type: self
                .property_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PropertyTypeCriterion::parse),
            listing: match self.listing.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(raw) => Some(raw.parse::<Listing>()?),
            },
            min_cap_rate: parse_number("minCapRate", self.min_cap_rate.as_deref())?,
            max_cap_rate: parse_number("maxCapRate", self.max_cap_rate.as_deref())?,
        };

        let params = AllPropertiesParams {
            limit: parse_limit(self.limit.as_deref(), default_limit)?,
            broker_id: None,
            skip_cache: parse_flag("skipCache", self.skip_cache.as_deref())?,
            full_data: parse_flag("fullData", self.full_data.as_deref())?,
        };

        Ok((filter, params))
    }
}

/// Body of `POST /api/buildout/validate-broker-email`
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl ValidateEmailRequest {
    /// Returns the normalized (trimmed, lowercased) email.
    pub fn validate(&self) -> Result<String> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::InvalidRequest("email is required".to_string()))?;

        if !is_plausible_email(email) {
            return Err(ApiError::InvalidRequest(format!(
                "'{}' is not a valid email address",
                email
            )));
        }
        Ok(email.to_ascii_lowercase())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

// == Parsing helpers ==

fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") => Ok(false),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => Err(ApiError::InvalidRequest(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}

fn parse_limit(raw: Option<&str>, default_limit: u32) -> Result<u32> {
    let limit = parse_number::<u32>("limit", raw)?.unwrap_or(default_limit);
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::InvalidRequest(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(limit)
}

fn parse_broker_id(raw: Option<&str>) -> Result<u64> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("brokerId is required".to_string()))?;

    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidRequest(format!(
            "brokerId must be a positive integer, got '{}'",
            raw
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::InvalidRequest(format!("{} must be a number, got '{}'", name, value))
        }),
    }
}
