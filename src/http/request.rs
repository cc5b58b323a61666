//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Read the request body under the configured size limit
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The ID is not echoed in responses; identical calls get identical envelopes

use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_LENGTH, HeaderName, HeaderValue, Request},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

use crate::gateway::request::INVALID_BODY;
use crate::gateway::GatewayError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Layer that assigns an `x-request-id` to requests that lack one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuidV4)
}

/// Read the whole body, refusing anything over `limit` bytes.
///
/// Only the size limit maps to 413; an aborted or malformed body is
/// reported like any other unparseable body.
pub async fn read_body(request: Request<Body>, limit: usize) -> Result<Bytes, GatewayError> {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(GatewayError::PayloadTooLarge);
    }

    match Limited::new(request.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(GatewayError::PayloadTooLarge),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            Err(GatewayError::validation(INVALID_BODY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_uuids() {
        let request = Request::new(());
        let id = MakeRequestUuidV4.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[tokio::test]
    async fn test_read_body_within_limit() {
        let request = Request::new(Body::from("{\"a\":1}"));
        let bytes = read_body(request, 64).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_read_body_over_limit() {
        let request = Request::new(Body::from(vec![b'x'; 128]));
        assert_eq!(read_body(request, 64).await.unwrap_err(), GatewayError::PayloadTooLarge);
    }

    #[tokio::test]
    async fn test_broken_body_is_not_too_large() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"address\":")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let request = Request::new(Body::from_stream(futures_util::stream::iter(chunks)));

        assert_eq!(
            read_body(request, 64).await.unwrap_err(),
            GatewayError::validation(INVALID_BODY)
        );
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let request = Request::builder()
            .header(CONTENT_LENGTH, "1000")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(read_body(request, 64).await.unwrap_err(), GatewayError::PayloadTooLarge);
    }
}
