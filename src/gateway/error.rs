//! Gateway error taxonomy and its outward mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Message returned for every provider-reported failure.
pub const PROVIDER_ERROR_MESSAGE: &str = "Location provider returned an error";

/// Every way a gateway call can end other than success.
///
/// Each variant maps to one fixed HTTP status and body shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Wrong HTTP verb.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Missing or malformed input; the message names the field.
    #[error("{0}")]
    Validation(String),

    /// Request body exceeded the configured limit or could not be read.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Provider credential unavailable.
    #[error("API configuration error")]
    Configuration,

    /// Outbound call failed, timed out, or did not return JSON.
    #[error("Upstream request failed")]
    UpstreamTransport { status: Option<u16> },

    /// Provider answered but reported a non-success status.
    #[error("{}", PROVIDER_ERROR_MESSAGE)]
    ProviderSemantic {
        status: Option<Value>,
        message: Option<Value>,
    },

    /// Anything else.
    #[error("Internal server error")]
    Internal,
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamTransport { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::ProviderSemantic { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MethodNotAllowed => "method_not_allowed",
            GatewayError::Validation(_) => "validation",
            GatewayError::PayloadTooLarge => "payload_too_large",
            GatewayError::Configuration => "configuration",
            GatewayError::UpstreamTransport { .. } => "upstream_transport",
            GatewayError::ProviderSemantic { .. } => "provider_semantic",
            GatewayError::Internal => "internal",
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            error: self.to_string(),
            details: None,
            status: None,
            upstream_status: None,
        };
        match self {
            GatewayError::UpstreamTransport { status } => body.upstream_status = *status,
            GatewayError::ProviderSemantic { status, message } => {
                body.details = message.clone();
                body.status = status.clone();
            }
            _ => {}
        }
        body
    }
}

/// Outward JSON shape of an error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
