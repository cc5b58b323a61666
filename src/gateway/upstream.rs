//! Provider query construction.
//!
//! Maps a validated [`GatewayRequest`] to a provider operation plus query
//! parameters. The credential is only attached when the final URL is built
//! so a [`ProviderQuery`] can be logged without leaking it.

use url::Url;

use crate::gateway::endpoint::Operation;
use crate::gateway::error::GatewayError;
use crate::gateway::request::GatewayRequest;

/// Query parameter carrying the provider credential.
const KEY_PARAM: &str = "key";

/// A provider call, minus the credential.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderQuery {
    pub operation: Operation,
    pub params: Vec<(&'static str, String)>,
}

impl ProviderQuery {
    /// Build the provider query for a validated request.
    pub fn build(request: &GatewayRequest, language: &str) -> Self {
        match request {
            GatewayRequest::Autocomplete(req) => Self {
                operation: Operation::PlacesAutocomplete,
                params: vec![
                    ("input", req.input.clone()),
                    ("types", req.types.clone()),
                    ("components", format!("country:{}", req.country)),
                    ("language", language.to_string()),
                ],
            },
            GatewayRequest::Details(req) => Self {
                operation: Operation::PlaceDetails,
                params: vec![
                    ("place_id", req.place_id.clone()),
                    ("fields", req.fields.join(",")),
                ],
            },
            GatewayRequest::Geocode(req) => Self {
                operation: Operation::Geocode,
                params: vec![
                    ("address", req.address.clone()),
                    ("components", req.components.clone()),
                ],
            },
            GatewayRequest::ReverseGeocode(req) => Self {
                operation: Operation::Geocode,
                params: vec![("latlng", format!("{},{}", req.lat, req.lng))],
            },
        }
    }

    /// Final URL with parameters and credential appended.
    ///
    /// The base URL is validated when configuration loads, so a failure here
    /// is reported as a configuration problem.
    pub fn url(&self, base_url: &str, api_key: &str) -> Result<Url, GatewayError> {
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), self.operation.path());
        let mut url = Url::parse(&endpoint).map_err(|e| {
            tracing::error!(error = %e, base_url = %base_url, "Invalid provider base URL");
            GatewayError::Configuration
        })?;

        url.query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair(KEY_PARAM, api_key);

        Ok(url)
    }
}
