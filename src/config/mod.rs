//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML, optional)
//!     → loader.rs (locate, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (resolved, immutable)
//!     → shared via Arc for the process lifetime
//! ```
//!
//! # Design Decisions
//! - Every key has a default; an absent file yields a fully defaulted record
//! - Environment overrides (LISTEN_ADDRESS) apply after file resolution
//! - Validation reports every violation, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{instance_id, resolve_settings, ConfigError};
pub use schema::Settings;
