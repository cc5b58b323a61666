//! Per-endpoint configuration.
//!
//! The four endpoints share one pipeline; everything that differs between
//! them lives in an [`EndpointSpec`] so the differences stay visible in one
//! table instead of being spread across four handlers.

use crate::gateway::normalize::ProviderStatus;

/// Provider operations the gateway can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlacesAutocomplete,
    PlaceDetails,
    Geocode,
}

impl Operation {
    /// Path of the operation relative to the provider base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::PlacesAutocomplete => "place/autocomplete/json",
            Operation::PlaceDetails => "place/details/json",
            Operation::Geocode => "geocode/json",
        }
    }

    /// Label used in logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Operation::PlacesAutocomplete => "places_autocomplete",
            Operation::PlaceDetails => "place_details",
            Operation::Geocode => "geocode",
        }
    }
}

/// Which provider statuses count as success for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPredicate {
    /// `OK` and `ZERO_RESULTS` are both successful answers.
    OkOrZeroResults,
    /// Only `OK` is success; the place details operation reports a missing
    /// place through `ZERO_RESULTS` or `NOT_FOUND` and both are errors.
    OkOnly,
}

impl SuccessPredicate {
    pub fn accepts(self, status: &ProviderStatus) -> bool {
        match (self, status) {
            (_, ProviderStatus::Ok) => true,
            (SuccessPredicate::OkOrZeroResults, ProviderStatus::ZeroResults) => true,
            _ => false,
        }
    }
}

/// Static description of one gateway endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub operation: Operation,
    pub success: SuccessPredicate,
}

const AUTOCOMPLETE: EndpointSpec = EndpointSpec {
    name: "autocomplete",
    path: "/autocomplete",
    operation: Operation::PlacesAutocomplete,
    success: SuccessPredicate::OkOrZeroResults,
};

const DETAILS: EndpointSpec = EndpointSpec {
    name: "details",
    path: "/details",
    operation: Operation::PlaceDetails,
    success: SuccessPredicate::OkOnly,
};

const GEOCODE: EndpointSpec = EndpointSpec {
    name: "geocode",
    path: "/geocode",
    operation: Operation::Geocode,
    success: SuccessPredicate::OkOrZeroResults,
};

const REVERSE_GEOCODE: EndpointSpec = EndpointSpec {
    name: "reverse-geocode",
    path: "/reverse-geocode",
    operation: Operation::Geocode,
    success: SuccessPredicate::OkOrZeroResults,
};

/// The four public endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Autocomplete,
    Details,
    Geocode,
    ReverseGeocode,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Autocomplete,
        Endpoint::Details,
        Endpoint::Geocode,
        Endpoint::ReverseGeocode,
    ];

    pub fn spec(self) -> &'static EndpointSpec {
        match self {
            Endpoint::Autocomplete => &AUTOCOMPLETE,
            Endpoint::Details => &DETAILS,
            Endpoint::Geocode => &GEOCODE,
            Endpoint::ReverseGeocode => &REVERSE_GEOCODE,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    pub fn path(self) -> &'static str {
        self.spec().path
    }

    pub fn operation(self) -> Operation {
        self.spec().operation
    }
}
