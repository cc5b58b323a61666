//! Provider HTTP client.
//!
//! # Responsibilities
//! - Perform exactly one GET per gateway call
//! - Bound the call with the configured deadline
//! - Separate transport failures from received, parseable responses
//!
//! # Security Constraints
//! - The request URL carries the credential; it is never logged

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ProviderConfig;
use crate::gateway::endpoint::Operation;
use crate::gateway::error::GatewayError;
use crate::gateway::normalize::UpstreamOutcome;
use crate::observability::metrics;
use crate::resilience::{with_deadline, DeadlineExceeded};

/// Why an outbound call produced no usable payload.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No response: connect/send failure.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Deadline expired before a full response arrived.
    #[error(transparent)]
    Timeout(#[from] DeadlineExceeded),

    /// Provider HTTP layer answered with a non-2xx status.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// Body could not be read to the end.
    #[error("failed to read body (HTTP {status}): {source}")]
    Body { status: u16, source: reqwest::Error },

    /// Body was read but is not JSON.
    #[error("body is not valid JSON (HTTP {status}): {source}")]
    InvalidJson { status: u16, source: serde_json::Error },
}

impl UpstreamError {
    /// HTTP status received from the provider, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Request(_) | UpstreamError::Timeout(_) => None,
            UpstreamError::Status(status)
            | UpstreamError::Body { status, .. }
            | UpstreamError::InvalidJson { status, .. } => Some(*status),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UpstreamError::Request(_) => "request_error",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status(_) => "http_status",
            UpstreamError::Body { .. } => "body_error",
            UpstreamError::InvalidJson { .. } => "invalid_json",
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        GatewayError::UpstreamTransport {
            status: err.http_status(),
        }
    }
}

/// Thin wrapper over a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ProviderClient {
    http: Client,
}

impl ProviderClient {
    /// Build the client. Proxy settings are read once, here.
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self { http: builder.build()? })
    }

    /// Call the provider once and parse its JSON body.
    pub async fn fetch(
        &self,
        operation: Operation,
        url: Url,
        deadline: Duration,
    ) -> Result<UpstreamOutcome, UpstreamError> {
        let start = Instant::now();
        let result = with_deadline(deadline, self.send(url))
            .await
            .map_err(UpstreamError::from)
            .and_then(|inner| inner);

        match &result {
            Ok(outcome) => {
                tracing::debug!(
                    operation = operation.name(),
                    http_status = outcome.http_status,
                    provider_status = %outcome.status.label(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Provider responded"
                );
                metrics::record_upstream(operation.name(), "response", start);
            }
            Err(e) => {
                tracing::warn!(
                    operation = operation.name(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Provider call failed"
                );
                metrics::record_upstream(operation.name(), e.label(), start);
            }
        }

        result
    }

    async fn send(&self, url: Url) -> Result<UpstreamOutcome, UpstreamError> {
        // Strip the URL from reqwest errors so the key cannot reach a log line.
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.without_url()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(UpstreamError::Status(status));
        }

        let bytes = response.bytes().await.map_err(|e| UpstreamError::Body {
            status,
            source: e.without_url(),
        })?;
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|source| UpstreamError::InvalidJson { status, source })?;

        Ok(UpstreamOutcome::new(payload, status))
    }
}
