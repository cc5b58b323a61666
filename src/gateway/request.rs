//! Request validation.
//!
//! Bodies are parsed into a loose [`serde_json::Value`] first and checked
//! field by field, so a wrong type can be told apart from a missing field
//! and each endpoint can answer with its own message. Defaults are only
//! applied to fields that are absent or `null`; a present field of the wrong
//! type is an error, never silently replaced.

use serde_json::{Map, Value};

use crate::gateway::endpoint::Endpoint;
use crate::gateway::error::GatewayError;

/// Autocomplete inputs shorter than this never reach the provider.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

pub const DEFAULT_AUTOCOMPLETE_TYPES: &str = "(cities)";
pub const DEFAULT_AUTOCOMPLETE_COUNTRY: &str = "us";
pub const DEFAULT_GEOCODE_COMPONENTS: &str = "country:US";
pub const DEFAULT_DETAILS_FIELDS: [&str; 5] = [
    "formatted_address",
    "geometry",
    "name",
    "place_id",
    "address_components",
];

pub const INVALID_BODY: &str = "Invalid JSON body";
pub const INPUT_NOT_STRING: &str = "input must be a string";
pub const PLACE_ID_REQUIRED: &str = "place_id is required";
pub const ADDRESS_REQUIRED: &str = "address is required";
pub const LAT_LNG_NOT_NUMBERS: &str = "lat and lng must be numbers";

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    pub input: String,
    pub types: String,
    pub country: String,
}

impl AutocompleteRequest {
    /// True when the input is too short to be worth a provider call.
    pub fn is_short(&self) -> bool {
        self.input.chars().count() < MIN_AUTOCOMPLETE_CHARS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailsRequest {
    pub place_id: String,
    /// Requested fields, de-duplicated, in first-seen order.
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub address: String,
    pub components: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseGeocodeRequest {
    pub lat: f64,
    pub lng: f64,
}

/// A validated request for any endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayRequest {
    Autocomplete(AutocompleteRequest),
    Details(DetailsRequest),
    Geocode(GeocodeRequest),
    ReverseGeocode(ReverseGeocodeRequest),
}

impl GatewayRequest {
    /// Parse and validate a raw body for `endpoint`.
    pub fn parse(endpoint: Endpoint, body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| GatewayError::validation(INVALID_BODY))?;
        let object = value
            .as_object()
            .ok_or_else(|| GatewayError::validation(INVALID_BODY))?;

        Ok(match endpoint {
            Endpoint::Autocomplete => GatewayRequest::Autocomplete(autocomplete(object)?),
            Endpoint::Details => GatewayRequest::Details(details(object)?),
            Endpoint::Geocode => GatewayRequest::Geocode(geocode(object)?),
            Endpoint::ReverseGeocode => GatewayRequest::ReverseGeocode(reverse_geocode(object)?),
        })
    }
}

/// Field that is absent or explicitly `null`.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

/// Optional text field; wrong type is an error naming the field.
fn optional_str<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, GatewayError> {
    match present(object, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(GatewayError::validation(format!("{} must be a string", key))),
    }
}

fn autocomplete(object: &Map<String, Value>) -> Result<AutocompleteRequest, GatewayError> {
    let input = match present(object, "input") {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(GatewayError::validation(INPUT_NOT_STRING)),
    };

    let types = optional_str(object, "types")?
        .unwrap_or(DEFAULT_AUTOCOMPLETE_TYPES)
        .to_string();

    let country = match present(object, "componentRestrictions") {
        None => None,
        Some(Value::Object(restrictions)) => optional_str(restrictions, "country")?,
        Some(_) => {
            return Err(GatewayError::validation(
                "componentRestrictions must be an object",
            ))
        }
    }
    .unwrap_or(DEFAULT_AUTOCOMPLETE_COUNTRY)
    .to_string();

    Ok(AutocompleteRequest { input, types, country })
}

fn details(object: &Map<String, Value>) -> Result<DetailsRequest, GatewayError> {
    let place_id = match present(object, "place_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => return Err(GatewayError::validation(PLACE_ID_REQUIRED)),
    };

    let fields = match present(object, "fields") {
        None => Vec::new(),
        Some(Value::Array(items)) => {
            let mut fields: Vec<String> = Vec::with_capacity(items.len());
            for item in items {
                let field = item
                    .as_str()
                    .ok_or_else(|| GatewayError::validation("fields must be an array of strings"))?;
                if !fields.iter().any(|f| f == field) {
                    fields.push(field.to_string());
                }
            }
            fields
        }
        Some(_) => return Err(GatewayError::validation("fields must be an array of strings")),
    };

    let fields = if fields.is_empty() {
        DEFAULT_DETAILS_FIELDS.iter().map(|f| f.to_string()).collect()
    } else {
        fields
    };

    Ok(DetailsRequest { place_id, fields })
}

fn geocode(object: &Map<String, Value>) -> Result<GeocodeRequest, GatewayError> {
    let address = match present(object, "address") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Err(GatewayError::validation(ADDRESS_REQUIRED)),
    };

    let components = optional_str(object, "components")?
        .unwrap_or(DEFAULT_GEOCODE_COMPONENTS)
        .to_string();

    Ok(GeocodeRequest { address, components })
}

fn reverse_geocode(object: &Map<String, Value>) -> Result<ReverseGeocodeRequest, GatewayError> {
    let number = |key: &str| {
        object
            .get(key)
            .filter(|v| v.is_number())
            .and_then(Value::as_f64)
            .ok_or_else(|| GatewayError::validation(LAT_LNG_NOT_NUMBERS))
    };

    Ok(ReverseGeocodeRequest {
        lat: number("lat")?,
        lng: number("lng")?,
    })
}
