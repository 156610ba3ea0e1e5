//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use rust_sample_app::config::Settings;
use rust_sample_app::http::outbound::{ObjectStore, OutboundError};
use rust_sample_app::http::SampleServer;
use rust_sample_app::metrics::MetricRegistry;
use rust_sample_app::Shutdown;

/// Install a processor-less tracer provider so spans carry real trace ids.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let provider = opentelemetry_sdk::trace::TracerProvider::builder().build();
        opentelemetry::global::set_tracer_provider(provider);
    });
}

/// Start a mock peer that returns 200 and counts hits.
pub async fn start_mock_backend(addr: SocketAddr) -> Arc<AtomicU32> {
    let hits = Arc::new(AtomicU32::new(0));
    let listener = TcpListener::bind(addr).await.unwrap();

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let body = "ok";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                Err(_) => break,
            }
        }
    });

    hits
}

/// Start a mock downstream sample app that records its own port into the
/// shared call log on every hit.
pub async fn start_downstream_backend(addr: SocketAddr, call_log: Arc<Mutex<Vec<u16>>>) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    call_log.lock().unwrap().push(addr.port());
                    let body = r#"{"traceId": "1-00000000-000000000000000000000000"}"#;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                Err(_) => break,
            }
        }
    });
}

/// Cloud-storage stub.
pub struct StubStore {
    pub fail: bool,
}

#[async_trait]
impl ObjectStore for StubStore {
    async fn list_buckets(&self) -> Result<usize, OutboundError> {
        if self.fail {
            Err(OutboundError::Storage("stub failure".to_string()))
        } else {
            Ok(3)
        }
    }
}

/// Bind the sample server on `addr` and run it in the background.
pub async fn start_sample_server(
    addr: SocketAddr,
    settings: Settings,
    store: Arc<dyn ObjectStore>,
    external_url: &str,
) -> Shutdown {
    init_tracing();

    let registry = MetricRegistry::new(opentelemetry::global::meter("integration-tests"), None);
    let server =
        SampleServer::with_external_url(Arc::new(settings), &registry, store, external_url)
            .unwrap();

    let listener = TcpListener::bind(addr).await.unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    // Give the server a beat to start accepting.
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown
}
