//! Configuration validation.
//!
//! Semantic checks run after serde has accepted the file. All violations
//! are collected and reported together, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::GateConfig;

/// A single semantic violation found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.throttle.quota_per_window == 0 {
        errors.push(ValidationError {
            field: "throttle.quota_per_window",
            message: "must be at least 1".to_string(),
        });
    }

    if config.throttle.window_secs == 0 {
        errors.push(ValidationError {
            field: "throttle.window_secs",
            message: "must be at least 1".to_string(),
        });
    }

    if config.audit.redis_addr.is_empty() {
        errors.push(ValidationError {
            field: "audit.redis_addr",
            message: "must not be empty".to_string(),
        });
    }

    if config.audit.queue_capacity == 0 {
        errors.push(ValidationError {
            field: "audit.queue_capacity",
            message: "must be at least 1".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
