//! Process-wide metric instrument registry.
//!
//! Wraps one OpenTelemetry [`Meter`] with the bookkeeping the application
//! needs: duplicate-registration detection, per-instance name suffixing, a
//! fixed attribute set per instrument, and guarded synchronous handles.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use opentelemetry::metrics::{
    AsyncInstrument, Counter, Histogram, Meter, ObservableCounter, ObservableGauge,
    UpDownCounter,
};
use opentelemetry::KeyValue;
use thiserror::Error;

/// Instrument families the registry can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentKind {
    Counter,
    UpDownCounter,
    ObservableGauge,
    ObservableCounter,
    Histogram,
}

/// Error type for instrument registration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("instrument {name:?} already registered as {kind:?}")]
    Duplicate { name: String, kind: InstrumentKind },
}

/// Process-wide set of named instruments.
///
/// Instruments live for the process lifetime. Registering the same
/// (name, kind) pair twice is a configuration error.
pub struct MetricRegistry {
    meter: Meter,
    instance_id: Option<String>,
    registered: Mutex<HashSet<(String, InstrumentKind)>>,
}

impl MetricRegistry {
    /// Create a registry over `meter`. When `instance_id` is set, every
    /// instrument name is suffixed with `_{instance_id}`.
    pub fn new(meter: Meter, instance_id: Option<String>) -> Self {
        Self {
            meter,
            instance_id,
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Register a monotonic counter.
    pub fn counter(
        &self,
        name: &str,
        unit: &'static str,
        description: &'static str,
        attributes: Vec<KeyValue>,
    ) -> Result<RegisteredCounter, RegistryError> {
        let name = self.claim(name, InstrumentKind::Counter)?;
        let counter = self
            .meter
            .u64_counter(name)
            .with_unit(unit)
            .with_description(description)
            .init();
        Ok(RegisteredCounter {
            counter,
            attributes,
            total: AtomicU64::new(0),
        })
    }

    /// Register an up-down counter.
    pub fn up_down_counter(
        &self,
        name: &str,
        unit: &'static str,
        description: &'static str,
        attributes: Vec<KeyValue>,
    ) -> Result<RegisteredUpDownCounter, RegistryError> {
        let name = self.claim(name, InstrumentKind::UpDownCounter)?;
        let counter = self
            .meter
            .i64_up_down_counter(name)
            .with_unit(unit)
            .with_description(description)
            .init();
        Ok(RegisteredUpDownCounter {
            counter,
            attributes,
        })
    }

    /// Register a histogram.
    pub fn histogram(
        &self,
        name: &str,
        unit: &'static str,
        description: &'static str,
        attributes: Vec<KeyValue>,
    ) -> Result<RegisteredHistogram, RegistryError> {
        let name = self.claim(name, InstrumentKind::Histogram)?;
        let histogram = self
            .meter
            .u64_histogram(name)
            .with_unit(unit)
            .with_description(description)
            .init();
        Ok(RegisteredHistogram {
            histogram,
            attributes,
        })
    }

    /// Register a pull-based gauge. `sample` runs on the sink's collection
    /// cycle and must not block.
    ///
    /// The returned handle must be kept alive for the callback to stay
    /// registered.
    pub fn observable_gauge(
        &self,
        name: &str,
        unit: &'static str,
        description: &'static str,
        attributes: Vec<KeyValue>,
        sample: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Result<ObservableGauge<u64>, RegistryError> {
        let name = self.claim(name, InstrumentKind::ObservableGauge)?;
        let gauge = self
            .meter
            .u64_observable_gauge(name)
            .with_unit(unit)
            .with_description(description)
            .with_callback(move |observer: &dyn AsyncInstrument<u64>| {
                observer.observe(sample(), &attributes)
            })
            .init();
        Ok(gauge)
    }

    /// Register a pull-based counter. Same callback contract as
    /// [`MetricRegistry::observable_gauge`].
    pub fn observable_counter(
        &self,
        name: &str,
        unit: &'static str,
        description: &'static str,
        attributes: Vec<KeyValue>,
        sample: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Result<ObservableCounter<u64>, RegistryError> {
        let name = self.claim(name, InstrumentKind::ObservableCounter)?;
        let counter = self
            .meter
            .u64_observable_counter(name)
            .with_unit(unit)
            .with_description(description)
            .with_callback(move |observer: &dyn AsyncInstrument<u64>| {
                observer.observe(sample(), &attributes)
            })
            .init();
        Ok(counter)
    }

    fn claim(&self, name: &str, kind: InstrumentKind) -> Result<String, RegistryError> {
        let full = self.full_name(name);
        let mut registered = self
            .registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !registered.insert((full.clone(), kind)) {
            return Err(RegistryError::Duplicate { name: full, kind });
        }
        Ok(full)
    }

    fn full_name(&self, name: &str) -> String {
        match &self.instance_id {
            Some(id) => format!("{name}_{id}"),
            None => name.to_string(),
        }
    }
}

/// Monotonic counter handle.
#[derive(Debug)]
pub struct RegisteredCounter {
    counter: Counter<u64>,
    attributes: Vec<KeyValue>,
    total: AtomicU64,
}

impl RegisteredCounter {
    /// Accumulate `delta`. A negative delta is a usage error: it is logged
    /// and dropped, and the process keeps running.
    pub fn add(&self, delta: i64) {
        let Ok(delta) = u64::try_from(delta) else {
            tracing::error!(delta, "monotonic counter rejected negative delta");
            return;
        };
        self.counter.add(delta, &self.attributes);
        self.total.fetch_add(delta, Ordering::Relaxed);
    }

    /// Running total of accepted deltas.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

/// Up-down counter handle; accepts any signed delta.
pub struct RegisteredUpDownCounter {
    counter: UpDownCounter<i64>,
    attributes: Vec<KeyValue>,
}

impl RegisteredUpDownCounter {
    pub fn add(&self, delta: i64) {
        self.counter.add(delta, &self.attributes);
    }
}

/// Histogram handle; accepts non-negative observations.
pub struct RegisteredHistogram {
    histogram: Histogram<u64>,
    attributes: Vec<KeyValue>,
}

impl RegisteredHistogram {
    /// Record one observation. Negative observations are logged and dropped.
    pub fn record(&self, value: i64) {
        let Ok(value) = u64::try_from(value) else {
            tracing::error!(value, "histogram rejected negative observation");
            return;
        };
        self.histogram.record(value, &self.attributes);
    }
}
