//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, method dispatch, middleware stack)
//!     → request.rs (request ID, bounded body read)
//!     → [gateway pipeline validates and calls the provider]
//!     → response.rs (status + JSON envelope)
//!     → cors.rs (headers on every response)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::Envelope;
pub use server::HttpServer;
