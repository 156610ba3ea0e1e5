//! Settings validation.
//!
//! Semantic checks on top of serde's syntactic parsing. Violations here are
//! configuration errors and abort startup.

use thiserror::Error;

use crate::config::schema::Settings;

/// A single semantic violation in the resolved settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("port must not be 0")]
    Port,

    #[error("time_interval must be at least 1 second (got {0})")]
    TimeInterval(u64),

    #[error("random_threads_active_upper_bound must be at least 1 (got {0})")]
    ThreadsUpperBound(i64),
}

/// Validate the resolved settings, collecting every violation.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.port == 0 {
        errors.push(ValidationError::Port);
    }
    if settings.time_interval == 0 {
        errors.push(ValidationError::TimeInterval(settings.time_interval));
    }
    if settings.random_threads_active_upper_bound < 1 {
        errors.push(ValidationError::ThreadsUpperBound(
            settings.random_threads_active_upper_bound,
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
