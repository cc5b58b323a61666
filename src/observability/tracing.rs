//! Request spans.
//!
//! # Responsibilities
//! - Create one span per inbound request
//! - Attach the request ID so every event in the handler carries it
//!
//! # Design Decisions
//! - The ID comes from the `x-request-id` header set by the request ID layer
//! - Spans are created by `TraceLayer`, not by handlers

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::X_REQUEST_ID;

/// `TraceLayer` span factory.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}
