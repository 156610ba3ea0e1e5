//! Telemetry-emitting sample application.
//!
//! A long-lived HTTP process demonstrating trace and metric emission: each
//! endpoint wraps an outbound call (HTTP fetch, cloud-storage listing, or
//! recursive self-call) in a span, request-scoped instruments are bumped on
//! every call, and a background driver perturbs two more instruments on a
//! fixed cadence.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /  /outgoing-http-call  /aws-sdk-call  /outgoing-sampleapp
//!        │
//!        ▼
//!   http::server ──▶ http::handlers ──▶ http::outbound ──▶ external HTTP,
//!        │                │                                cloud storage,
//!        │                ├─▶ trace::    (spans, X-Ray ids) downstream
//!        │                └─▶ metrics::  (request metrics)  instances
//!        │
//!   metrics::random   (background driver, pull-based gauges)
//!   observability::   (logging, tracer/meter providers → OTLP sink)
//!   config::          (settings file + environment overrides)
//!   lifecycle         (shutdown broadcast + signals)
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod metrics;
pub mod observability;
pub mod trace;

pub use config::Settings;
pub use http::SampleServer;
pub use lifecycle::Shutdown;
