//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stdout)
//!     → traces.rs  (TracerProvider; finished spans → OTLP collector)
//!     → metrics.rs (SdkMeterProvider; instrument readings → OTLP collector)
//! ```
//!
//! # Design Decisions
//! - The exporter side is the sink boundary: batching, transport and retry
//!   all live in the SDK and collector, not here
//! - Without a configured OTLP endpoint both providers fall back to no-op
//!   sinks so the process (and the test suite) runs standalone

pub mod logging;
pub mod metrics;
pub mod traces;
