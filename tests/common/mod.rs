//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use location_gateway::config::GatewayConfig;
use location_gateway::http::HttpServer;
use location_gateway::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// What the mock provider saw.
#[derive(Clone, Default)]
pub struct ProviderLog {
    hits: Arc<AtomicUsize>,
    targets: Arc<Mutex<Vec<String>>>,
}

impl ProviderLog {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request targets (path and query) in arrival order.
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        403 => "403 Forbidden",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Start a mock provider that answers every call with `status` and `body`.
pub async fn start_mock_provider(status: u16, body: impl Into<String>) -> (SocketAddr, ProviderLog) {
    let body = body.into();
    start_programmable_provider(move |_| {
        let body = body.clone();
        async move { (status, body) }
    })
    .await
}

/// Start a programmable mock provider. The closure receives the request
/// target and returns the status and body to send back.
pub async fn start_programmable_provider<F, Fut>(f: F) -> (SocketAddr, ProviderLog)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = ProviderLog::default();
    let f = Arc::new(f);

    let task_log = log.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = task_log.clone();
                    tokio::spawn(async move {
                        let target = read_request_target(&mut socket).await;
                        log.hits.fetch_add(1, Ordering::SeqCst);
                        log.targets.lock().unwrap().push(target.clone());

                        let (status, body) = f(target).await;
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

/// Read headers of a GET request and return its target.
async fn read_request_target(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&buf);
    head.split_whitespace().nth(1).unwrap_or_default().to_string()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Gateway configuration pointed at `provider`.
pub fn gateway_config(provider: SocketAddr, api_key: Option<&str>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.provider.base_url = format!("http://{}/maps/api", provider);
    config.provider.api_key = api_key.map(String::from);
    config.provider.use_system_proxy = false;
    config.provider.timeout_secs = 2;
    config
}

/// A running gateway; shuts down when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub config_updates: mpsc::UnboundedSender<GatewayConfig>,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (config_updates, config_rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, config_rx, server_shutdown).await;
    });

    TestGateway {
        addr,
        config_updates,
        shutdown,
    }
}

/// HTTP client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
