//! Location Services Gateway Library
//!
//! A small HTTP gateway that fronts a geocoding and places provider with four
//! JSON endpoints: autocomplete, place details, forward geocoding and reverse
//! geocoding. Browser clients call it directly; the provider credential stays
//! on the server.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::GatewayConfig;
pub use gateway::{Endpoint, Gateway, GatewayError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
