//! Provider response classification.
//!
//! The provider answers HTTP 200 for both results and failures and reports
//! the real outcome in the body's `status` field. This module turns that
//! field into an outward [`Envelope`] or a semantic error.

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::gateway::endpoint::EndpointSpec;
use crate::gateway::error::GatewayError;
use crate::http::response::Envelope;

/// Status reported inside a provider payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    /// Any other (or missing) status, with the optional error message,
    /// both kept verbatim for echoing back.
    Other {
        status: Option<Value>,
        message: Option<Value>,
    },
}

impl ProviderStatus {
    pub fn from_payload(payload: &Value) -> Self {
        match payload.get("status").and_then(Value::as_str) {
            Some("OK") => ProviderStatus::Ok,
            Some("ZERO_RESULTS") => ProviderStatus::ZeroResults,
            _ => ProviderStatus::Other {
                status: payload.get("status").cloned(),
                message: payload.get("error_message").cloned(),
            },
        }
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> String {
        match self {
            ProviderStatus::Ok => "OK".to_string(),
            ProviderStatus::ZeroResults => "ZERO_RESULTS".to_string(),
            ProviderStatus::Other { status: Some(Value::String(s)), .. } => s.clone(),
            ProviderStatus::Other { .. } => "UNKNOWN".to_string(),
        }
    }
}

/// A provider response that arrived intact and parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOutcome {
    pub status: ProviderStatus,
    pub payload: Value,
    pub http_status: u16,
}

impl UpstreamOutcome {
    pub fn new(payload: Value, http_status: u16) -> Self {
        Self {
            status: ProviderStatus::from_payload(&payload),
            payload,
            http_status,
        }
    }
}

/// Map a provider outcome to the outward envelope for `spec`.
pub fn normalize(spec: &EndpointSpec, outcome: UpstreamOutcome) -> Result<Envelope, GatewayError> {
    if spec.success.accepts(&outcome.status) {
        return Ok(Envelope::new(StatusCode::OK, outcome.payload));
    }

    match outcome.status {
        ProviderStatus::Other { status, message } => {
            Err(GatewayError::ProviderSemantic { status, message })
        }
        // A known status this endpoint does not accept (ZERO_RESULTS on details).
        known => Err(GatewayError::ProviderSemantic {
            status: Some(Value::String(known.label())),
            message: outcome.payload.get("error_message").cloned(),
        }),
    }
}

/// Envelope returned for autocomplete inputs too short to look up.
pub fn empty_predictions() -> Envelope {
    Envelope::new(StatusCode::OK, json!({ "predictions": [] }))
}
