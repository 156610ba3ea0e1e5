//! Settings schema definitions.
//!
//! All types derive Serde traits for deserialization from the settings file.

use serde::{Deserialize, Serialize};

/// Resolved settings for the sample application.
///
/// Every key has a documented default so a missing or minimal settings file
/// still yields a runnable process. The record is immutable once resolved and
/// lives for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Address the HTTP server binds to.
    pub host: String,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// Random metric driver tick cadence, in seconds.
    pub time_interval: u64,

    /// Amount added to the `timeAlive` counter on every driver tick.
    pub random_time_alive_incrementer: u64,

    /// Upper bound for `totalHeapSize` gauge samples.
    pub random_total_heap_size_upper_bound: u64,

    /// Upper bound for the `threadsActive` oscillator.
    pub random_threads_active_upper_bound: i64,

    /// Upper bound for `cpuUsage` gauge samples.
    pub random_cpu_usage_upper_bound: u64,

    /// Ports of downstream sample-app instances targeted by the
    /// `/outgoing-sampleapp` fan-out, in invocation order.
    pub sample_app_ports: Vec<u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            time_interval: 1,
            random_time_alive_incrementer: 1,
            random_total_heap_size_upper_bound: 100,
            random_threads_active_upper_bound: 10,
            random_cpu_usage_upper_bound: 100,
            sample_app_ports: Vec::new(),
        }
    }
}

impl Settings {
    /// Address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
