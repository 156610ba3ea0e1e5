//! Random metric driver.
//!
//! One perpetual background task perturbs the push-based instruments every
//! `time_interval` seconds; the pull-based gauges draw a fresh sample
//! whenever the sink collects.

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::metrics::ObservableGauge;
use opentelemetry::KeyValue;
use rand::Rng;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::Settings;
use crate::metrics::registry::{
    MetricRegistry, RegisteredCounter, RegisteredUpDownCounter, RegistryError,
};

fn random_metric_attributes() -> Vec<KeyValue> {
    vec![
        KeyValue::new("signal", "metric"),
        KeyValue::new("language", "rust"),
        KeyValue::new("metricType", "random"),
    ]
}

/// Oscillator direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increasing,
    Decreasing,
}

/// State of the `threadsActive` oscillator. Owned exclusively by the driver
/// task; never shared with request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OscillatorState {
    pub thread_count: i64,
    pub direction: Direction,
}

impl OscillatorState {
    pub fn new() -> Self {
        Self {
            thread_count: 0,
            direction: Direction::Increasing,
        }
    }

    /// Advance one tick and return the emitted delta.
    ///
    /// A tick that finds the count at a bound flips the direction and still
    /// emits, so the bound value holds for exactly one tick and the count
    /// never leaves `[0, upper_bound]`. The trajectory repeats with period
    /// `2 * upper_bound`.
    pub fn step(&mut self, upper_bound: i64) -> i64 {
        match self.direction {
            Direction::Increasing => {
                if self.thread_count < upper_bound {
                    self.thread_count += 1;
                    1
                } else {
                    self.direction = Direction::Decreasing;
                    self.thread_count -= 1;
                    -1
                }
            }
            Direction::Decreasing => {
                if self.thread_count > 0 {
                    self.thread_count -= 1;
                    -1
                } else {
                    self.direction = Direction::Increasing;
                    self.thread_count += 1;
                    1
                }
            }
        }
    }
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Background driver for the `timeAlive` counter and `threadsActive`
/// oscillator, plus the pull-based `cpuUsage` / `totalHeapSize` gauges.
pub struct RandomMetricDriver {
    settings: Arc<Settings>,
    time_alive: RegisteredCounter,
    threads_active: RegisteredUpDownCounter,
    // Keep the gauge callbacks registered for the process lifetime.
    _cpu_usage: ObservableGauge<u64>,
    _heap_size: ObservableGauge<u64>,
}

impl RandomMetricDriver {
    pub fn new(registry: &MetricRegistry, settings: Arc<Settings>) -> Result<Self, RegistryError> {
        let attributes = random_metric_attributes();

        let time_alive = registry.counter(
            "timeAlive",
            "s",
            "Total amount of time that the application has been alive",
            attributes.clone(),
        )?;

        let threads_active = registry.up_down_counter(
            "threadsActive",
            "1",
            "The total amount of threads active",
            attributes.clone(),
        )?;

        let cpu_upper_bound = settings.random_cpu_usage_upper_bound;
        let cpu_usage = registry.observable_gauge(
            "cpuUsage",
            "%",
            "Cpu usage percent",
            attributes.clone(),
            move || rand::thread_rng().gen_range(0..=cpu_upper_bound),
        )?;

        let heap_upper_bound = settings.random_total_heap_size_upper_bound;
        let heap_size = registry.observable_gauge(
            "totalHeapSize",
            "By",
            "The current total heap size",
            attributes,
            move || rand::thread_rng().gen_range(0..=heap_upper_bound),
        )?;

        Ok(Self {
            settings,
            time_alive,
            threads_active,
            _cpu_usage: cpu_usage,
            _heap_size: heap_size,
        })
    }

    /// Run the perpetual tick loop. Started once at process startup; the
    /// shutdown receiver exists so tests can tear the task down cleanly.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.settings.time_interval,
            threads_upper_bound = self.settings.random_threads_active_upper_bound,
            "random metric driver starting"
        );

        let mut state = OscillatorState::new();
        let mut ticker = time::interval(Duration::from_secs(self.settings.time_interval));

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(&mut state),
                _ = shutdown.recv() => {
                    tracing::info!("random metric driver received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn tick(&self, state: &mut OscillatorState) {
        self.time_alive
            .add(self.settings.random_time_alive_incrementer as i64);
        let delta = state.step(self.settings.random_threads_active_upper_bound);
        self.threads_active.add(delta);

        tracing::debug!(
            time_alive = self.time_alive.total(),
            threads_active = state.thread_count,
            delta,
            "driver tick"
        );
    }
}
