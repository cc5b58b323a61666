//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Inbound deadline longer than the provider deadline
//! - Check addresses and the provider URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - A missing provider key is not an error; the gateway reports it per request

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("provider.base_url '{0}' is not an http(s) URL")]
    ProviderUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs ({request}) must be greater than provider.timeout_secs ({provider})")]
    TimeoutOrder { request: u64, provider: u64 },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.provider.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::ProviderUrl(config.provider.base_url.clone())),
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("provider.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    // A slow provider must surface as a provider timeout, not an inbound one.
    if config.provider.timeout_secs > 0
        && config.timeouts.request_secs <= config.provider.timeout_secs
    {
        errors.push(ValidationError::TimeoutOrder {
            request: config.timeouts.request_secs,
            provider: config.provider.timeout_secs,
        });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
