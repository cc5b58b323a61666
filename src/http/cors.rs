//! CORS headers.
//!
//! Browsers discard any cross-origin response without these headers, so they
//! are attached by the outermost layer: successes, errors, timeouts and
//! caught panics all pass through it. The values are fixed, which is why
//! `SetResponseHeaderLayer` is used instead of a negotiating CORS layer.

use axum::http::{
    header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
    HeaderName, HeaderValue,
};
use tower::layer::util::Stack;
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// The full CORS header set.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN)),
        (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
        (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
    ]
}

pub type CorsLayer = Stack<
    SetResponseHeaderLayer<HeaderValue>,
    Stack<SetResponseHeaderLayer<HeaderValue>, SetResponseHeaderLayer<HeaderValue>>,
>;

/// Layer that overrides the CORS headers on every response.
pub fn cors_layer() -> CorsLayer {
    let [(origin_name, origin), (headers_name, headers), (methods_name, methods)] = cors_headers();
    Stack::new(
        SetResponseHeaderLayer::overriding(origin_name, origin),
        Stack::new(
            SetResponseHeaderLayer::overriding(headers_name, headers),
            SetResponseHeaderLayer::overriding(methods_name, methods),
        ),
    )
}
