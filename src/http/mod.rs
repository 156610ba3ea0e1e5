//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! inbound GET
//!     → server.rs (Axum router, middleware, shared state)
//!     → handlers.rs (span around the outbound side effect)
//!     → outbound.rs (HTTP fetch / storage listing / downstream self-call)
//!     → request metrics, then {"traceId": …} response
//! ```

pub mod handlers;
pub mod outbound;
pub mod server;

pub use server::{AppState, SampleServer};
