//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Environment variable overriding the listener bind address.
pub const BIND_ADDRESS_ENV: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config)
}

/// Build configuration from defaults plus environment overrides.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default())
}

fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    apply_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment-style overrides from `lookup`.
///
/// Empty values are ignored so an exported-but-blank variable does not
/// wipe out a key set in the file.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty(API_KEY_ENV) {
        config.provider.api_key = Some(key);
    }
    if let Some(addr) = non_empty(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
}
