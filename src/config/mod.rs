//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or defaults
//!     → loader.rs (parse, deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via ArcSwap to all handlers
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<GatewayConfig>
//!     → requests started afterwards observe new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The provider credential can come from `GOOGLE_MAPS_API_KEY`

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::GatewayConfig;
pub use schema::{ListenerConfig, LogFormat, ObservabilityConfig, ProviderConfig};
pub use watcher::ConfigWatcher;
