//! Process entry point: resolve settings, install the telemetry providers,
//! start the random metric driver, and serve HTTP until a signal arrives.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rust_sample_app::config;
use rust_sample_app::http::outbound::S3Store;
use rust_sample_app::http::SampleServer;
use rust_sample_app::lifecycle::{self, Shutdown};
use rust_sample_app::metrics::{MetricRegistry, RandomMetricDriver};
use rust_sample_app::observability::{logging, metrics, traces};

/// Telemetry-emitting sample application.
#[derive(Debug, Parser)]
#[command(name = "rust-sample-app", version)]
struct Cli {
    /// Path to the TOML settings file. Falls back to $SAMPLE_APP_CONFIG,
    /// then ./config.toml, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// OTLP collector endpoint. Telemetry export is disabled when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init_logging();
    tracing::info!("rust-sample-app v{} starting", env!("CARGO_PKG_VERSION"));

    // Startup-time failures below this point are fatal; anything after the
    // server starts only ever fails the request it belongs to.
    let settings = Arc::new(config::resolve_settings(cli.config.as_deref())?);
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        time_interval_secs = settings.time_interval,
        downstream_ports = settings.sample_app_ports.len(),
        "settings resolved"
    );

    traces::init_traces(cli.otlp_endpoint.as_deref())?;
    let meter_provider = metrics::init_metrics(cli.otlp_endpoint.as_deref())?;

    let registry = MetricRegistry::new(
        opentelemetry::global::meter("rust-sample-app"),
        config::instance_id(),
    );

    let shutdown = Shutdown::new();

    let driver = RandomMetricDriver::new(&registry, settings.clone())?;
    tokio::spawn(driver.run(shutdown.subscribe()));

    let store = Arc::new(S3Store::load().await);
    let server = SampleServer::new(settings.clone(), &registry, store)?;

    let listener = TcpListener::bind(settings.bind_address()).await?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        lifecycle::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    // Push any final spans and readings to the collector before exit.
    meter_provider.shutdown()?;
    opentelemetry::global::shutdown_tracer_provider();

    tracing::info!("shutdown complete");
    Ok(())
}
