//! Location services gateway.
//!
//! # Data Flow
//! ```text
//! raw body + Endpoint
//!     → request.rs   (validate, apply defaults)        VALIDATING
//!     → [autocomplete short-circuit]
//!     → upstream.rs  (provider operation + params)     BUILDING
//!     → client.rs    (one GET, bounded by deadline)    INVOKING
//!     → normalize.rs (provider status → envelope)      NORMALIZING
//! ```
//!
//! # Design Decisions
//! - One pipeline for all four endpoints; per-endpoint differences live in
//!   `endpoint.rs`
//! - Every stage fails closed: an error stops the pipeline before the next
//!   stage runs
//! - Configuration is read once per call from an atomic snapshot

pub mod client;
pub mod endpoint;
pub mod error;
pub mod normalize;
pub mod request;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::config::GatewayConfig;
use crate::http::response::Envelope;

pub use client::{ProviderClient, UpstreamError};
pub use endpoint::{Endpoint, EndpointSpec, Operation, SuccessPredicate};
pub use error::GatewayError;
pub use normalize::{ProviderStatus, UpstreamOutcome};
pub use request::GatewayRequest;
pub use upstream::ProviderQuery;

/// Shared gateway state: live configuration plus the provider client.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<ArcSwap<GatewayConfig>>,
    client: ProviderClient,
}

impl Gateway {
    pub fn new(config: Arc<ArcSwap<GatewayConfig>>, client: ProviderClient) -> Self {
        Self { config, client }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<GatewayConfig> {
        self.config.load_full()
    }

    /// Run one call through the pipeline.
    ///
    /// Validation and the short-input check run before the credential check,
    /// so a short autocomplete input answers `{predictions: []}` even when no
    /// API key is configured.
    pub async fn handle(&self, endpoint: Endpoint, body: &[u8]) -> Result<Envelope, GatewayError> {
        let config = self.config();

        let request = GatewayRequest::parse(endpoint, body).inspect_err(|e| {
            tracing::info!(endpoint = endpoint.name(), kind = e.kind(), error = %e, "Rejected request");
        })?;

        if let GatewayRequest::Autocomplete(req) = &request {
            if req.is_short() {
                tracing::debug!(endpoint = endpoint.name(), "Input too short, skipping provider");
                return Ok(normalize::empty_predictions());
            }
        }

        let Some(api_key) = config.provider.api_key() else {
            tracing::error!(endpoint = endpoint.name(), "Provider API key is not configured");
            return Err(GatewayError::Configuration);
        };

        let query = ProviderQuery::build(&request, &config.provider.language);
        let url = query.url(&config.provider.base_url, api_key)?;
        let deadline = Duration::from_secs(config.provider.timeout_secs);

        let outcome = self.client.fetch(query.operation, url, deadline).await?;

        normalize::normalize(endpoint.spec(), outcome).inspect_err(|e| {
            if let GatewayError::ProviderSemantic { status, .. } = e {
                tracing::warn!(
                    endpoint = endpoint.name(),
                    provider_status = ?status,
                    "Provider reported an error"
                );
            }
        })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("provider", &self.config.load().provider)
            .finish()
    }
}
