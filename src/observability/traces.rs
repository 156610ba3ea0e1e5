//! Tracer provider setup: finished spans flow to the OTLP collector.

use opentelemetry::trace::TraceError;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Config, Sampler, TracerProvider};
use opentelemetry_sdk::Resource;

/// Service name reported with every span and metric reading.
pub const SERVICE_NAME: &str = "rust-sampleapp-service";

/// Resource shared by the tracer and meter providers.
pub fn resource() -> Resource {
    Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)])
}

/// Install the global tracer provider.
///
/// With an endpoint, finished spans are batched to the OTLP collector over
/// gRPC. Without one the provider still issues real span contexts but has no
/// processor, so spans are dropped at the sink boundary.
pub fn init_traces(otlp_endpoint: Option<&str>) -> Result<TracerProvider, TraceError> {
    let mut builder = TracerProvider::builder().with_config(
        Config::default()
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(resource()),
    );

    if let Some(endpoint) = otlp_endpoint {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .build_span_exporter()?;
        builder = builder.with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio);
        tracing::info!(endpoint, "OTLP span exporter configured");
    }

    let provider = builder.build();
    global::set_tracer_provider(provider.clone());
    Ok(provider)
}
