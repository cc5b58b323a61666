//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the four gateway endpoints
//! - Wire up middleware (CORS, panic capture, request ID, tracing, timeout)
//! - Method handling per call: preflight, POST, everything else rejected
//! - Apply configuration reloads without restarting
//! - Bind server to listener with graceful shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! CORS headers → catch panic → request ID → trace span → timeout → handler
//! ```

use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    BoxError, Json, Router,
};
use arc_swap::ArcSwap;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::gateway::{Endpoint, Gateway, GatewayError, ProviderClient};
use crate::http::cors::cors_layer;
use crate::http::request::{read_body, request_id_layer};
use crate::observability::{metrics, tracing::make_request_span};

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: Gateway,
}

/// HTTP server for the location gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<ArcSwap<GatewayConfig>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = ProviderClient::new(&config.provider)?;
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);
        let config = Arc::new(ArcSwap::from_pointee(config));

        let state = AppState {
            gateway: Gateway::new(config.clone(), client),
        };

        let router = Self::build_router(request_timeout, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        let mut router = Router::new().route("/health", get(health_handler));

        for endpoint in Endpoint::ALL {
            router = router.route(
                endpoint.path(),
                any(move |State(state): State<AppState>, request: Request<Body>| {
                    gateway_handler(endpoint, state, request)
                }),
            );
        }

        Self::with_layers(
            router.fallback(not_found_handler).with_state(state),
            request_timeout,
        )
    }

    /// Wrap routes in the middleware stack. Every response, including
    /// timeouts and caught panics, leaves through the CORS layer.
    fn with_layers(routes: Router, request_timeout: Duration) -> Router {
        routes
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(timeout_response))
                    .timeout(request_timeout),
            )
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(request_id_layer())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(cors_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configurations arriving on `config_updates` replace the live one;
    /// requests already in flight finish with the snapshot they started with.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let live = self.config.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                tracing::info!(
                    provider = ?new_config.provider,
                    "Applying reloaded configuration"
                );
                live.store(Arc::new(new_config));
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Shared shape of the four endpoints: preflight, POST pipeline, or 405.
async fn gateway_handler(endpoint: Endpoint, state: AppState, request: Request<Body>) -> Response {
    let start_time = Instant::now();

    let method = request.method().clone();
    tracing::debug!(endpoint = endpoint.name(), method = %method, "Handling request");

    let response = match method {
        Method::OPTIONS => (StatusCode::OK, "ok").into_response(),
        Method::POST => {
            let limit = state.gateway.config().security.max_body_size;
            let result = match read_body(request, limit).await {
                Ok(body) => state.gateway.handle(endpoint, &body).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                metrics::record_error(endpoint.name(), e.kind());
            }
            result.into_response()
        }
        _ => {
            let error = GatewayError::MethodNotAllowed;
            metrics::record_error(endpoint.name(), error.kind());
            error.into_response()
        }
    };

    metrics::record_request(endpoint.name(), response.status().as_u16(), start_time);
    response
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Inbound deadline expiry. Configuration keeps this deadline longer than
/// the provider's, so reaching it means the provider call stalled.
async fn timeout_response(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!("Request deadline exceeded");
        GatewayError::UpstreamTransport { status: None }.into_response()
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        GatewayError::Internal.into_response()
    }
}

/// Convert a caught panic into the generic internal error.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    GatewayError::Internal.into_response()
}
