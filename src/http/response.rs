//! Response envelope.
//!
//! # Responsibilities
//! - Carry the outward status and JSON body of a successful call
//! - Serialize as `application/json`
//!
//! # Design Decisions
//! - CORS headers are not set here; the shell layer in `cors.rs` adds them
//!   to every response, including errors and caught panics
//! - Serialization is deterministic: same body, same bytes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

/// Outward status plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: StatusCode,
    pub body: Value,
}

impl Envelope {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
