//! Request-scoped metric instruments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use opentelemetry::metrics::ObservableCounter;
use opentelemetry::KeyValue;
use rand::Rng;

use crate::metrics::registry::{
    MetricRegistry, RegisteredCounter, RegisteredHistogram, RegistryError,
};

/// Largest per-request value recorded for `totalBytesSent`.
const BYTES_SENT_UPPER_BOUND: u64 = 1024;

/// Largest per-request value recorded for `latencyTime`.
const LATENCY_UPPER_BOUND: u64 = 512;

fn request_metric_attributes() -> Vec<KeyValue> {
    vec![
        KeyValue::new("signal", "metric"),
        KeyValue::new("language", "rust"),
        KeyValue::new("metricType", "request"),
    ]
}

/// Instruments updated on every trace-emitting request.
pub struct RequestMetrics {
    bytes_sent: RegisteredCounter,
    latency: RegisteredHistogram,
    collections: Arc<AtomicU64>,
    // Keeps the totalApiRequests callback registered for the process lifetime.
    _api_requests: ObservableCounter<u64>,
}

impl RequestMetrics {
    pub fn new(registry: &MetricRegistry) -> Result<Self, RegistryError> {
        let attributes = request_metric_attributes();

        let bytes_sent = registry.counter(
            "totalBytesSent",
            "By",
            "Keeps a sum of the total amount of bytes sent while the application is alive",
            attributes.clone(),
        )?;

        let latency = registry.histogram(
            "latencyTime",
            "ms",
            "Measures latency time",
            attributes.clone(),
        )?;

        // The tally advances once per sink collection cycle, not once per
        // served request: the exported series counts how many times the sink
        // has collected. Intentional; see DESIGN.md.
        let collections = Arc::new(AtomicU64::new(0));
        let tally = collections.clone();
        let api_requests = registry.observable_counter(
            "totalApiRequests",
            "1",
            "Increments by one every time a sampleapp endpoint is used",
            attributes,
            move || tally.fetch_add(1, Ordering::Relaxed) + 1,
        )?;

        Ok(Self {
            bytes_sent,
            latency,
            collections,
            _api_requests: api_requests,
        })
    }

    /// Record the per-request measurements: a bytes-sent value uniform in
    /// [0, 1024] and a latency observation uniform in [0, 512]. Runs after
    /// the traced call completes and before the response is built.
    pub fn record_request(&self) {
        let mut rng = rand::thread_rng();
        self.bytes_sent
            .add(rng.gen_range(0..=BYTES_SENT_UPPER_BOUND) as i64);
        self.latency
            .record(rng.gen_range(0..=LATENCY_UPPER_BOUND) as i64);
    }

    /// Running total of bytes-sent values accepted so far.
    pub fn total_bytes_sent(&self) -> u64 {
        self.bytes_sent.total()
    }

    /// Number of sink collection cycles observed so far.
    pub fn collection_count(&self) -> u64 {
        self.collections.load(Ordering::Relaxed)
    }
}
