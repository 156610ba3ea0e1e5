//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request tracing, timeout)
//! - Hold the shared application state
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::http::handlers;
use crate::http::outbound::{ObjectStore, EXTERNAL_URL};
use crate::metrics::{MetricRegistry, RegistryError, RequestMetrics};
use crate::trace::TraceEngine;

/// Request timeout. Generous because the traced outbound calls are real
/// network operations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub engine: Arc<TraceEngine>,
    pub request_metrics: Arc<RequestMetrics>,
    pub http: reqwest::Client,
    pub store: Arc<dyn ObjectStore>,
    pub external_url: String,
}

/// HTTP server for the sample application.
pub struct SampleServer {
    router: Router,
    settings: Arc<Settings>,
}

impl SampleServer {
    /// Build the server against the production external URL.
    pub fn new(
        settings: Arc<Settings>,
        registry: &MetricRegistry,
        store: Arc<dyn ObjectStore>,
    ) -> Result<Self, RegistryError> {
        Self::with_external_url(settings, registry, store, EXTERNAL_URL)
    }

    /// Build the server with an explicit external target. Integration tests
    /// point this at a local mock.
    pub fn with_external_url(
        settings: Arc<Settings>,
        registry: &MetricRegistry,
        store: Arc<dyn ObjectStore>,
        external_url: &str,
    ) -> Result<Self, RegistryError> {
        let state = AppState {
            settings: settings.clone(),
            engine: Arc::new(TraceEngine::new()),
            request_metrics: Arc::new(RequestMetrics::new(registry)?),
            http: reqwest::Client::new(),
            store,
            external_url: external_url.to_string(),
        };

        let router = Self::build_router(state);
        Ok(Self { router, settings })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::root))
            .route("/outgoing-http-call", get(handlers::outgoing_http_call))
            .route("/aws-sdk-call", get(handlers::aws_sdk_call))
            .route("/outgoing-sampleapp", get(handlers::outgoing_sampleapp))
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the resolved settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
