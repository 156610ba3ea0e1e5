//! Meter provider setup: instrument readings flow to the OTLP collector.

use std::time::Duration;

use opentelemetry::global;
use opentelemetry::metrics::MetricsError;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::metrics::{ManualReader, SdkMeterProvider};

use crate::observability::traces::resource;

/// Cadence of the sink's collection cycle. Pull-based instrument callbacks
/// run once per cycle.
const EXPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Install the global meter provider.
///
/// With an endpoint, readings are collected and pushed to the OTLP collector
/// on a fixed period. Without one, measurements are recorded but never
/// exported.
pub fn init_metrics(otlp_endpoint: Option<&str>) -> Result<SdkMeterProvider, MetricsError> {
    let provider = match otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint)
                .with_protocol(Protocol::Grpc);
            let provider = opentelemetry_otlp::new_pipeline()
                .metrics(opentelemetry_sdk::runtime::Tokio)
                .with_exporter(exporter)
                .with_resource(resource())
                .with_period(EXPORT_INTERVAL)
                .build()?;
            tracing::info!(endpoint, "OTLP metrics exporter configured");
            provider
        }
        None => {
            let reader = ManualReader::builder().build();
            SdkMeterProvider::builder()
                .with_reader(reader)
                .with_resource(resource())
                .build()
        }
    };

    global::set_meter_provider(provider.clone());
    Ok(provider)
}
