//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admission gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Quota and window for admission decisions.
    pub throttle: ThrottleConfig,

    /// Audit store and queue settings.
    pub audit: AuditConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8989").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8989".to_string(),
        }
    }
}

/// Admission throttling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Maximum requests per identity within one window.
    pub quota_per_window: u64,

    /// Window length in seconds. The counter table is discarded wholesale
    /// at every boundary.
    pub window_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            quota_per_window: 10,
            window_secs: 60,
        }
    }
}

/// Audit store and queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Redis address, host:port or a full redis:// URL.
    pub redis_addr: String,

    /// Capacity of the bounded audit queue.
    pub queue_capacity: usize,

    /// How long a submission may wait on a full queue before the request
    /// is answered server-busy.
    pub submit_timeout_ms: u64,

    /// Connection attempts before startup gives up on the store.
    pub connect_max_attempts: u32,

    /// Delay between connection attempts in seconds.
    pub connect_retry_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            redis_addr: "127.0.0.1:6379".to_string(),
            queue_capacity: 5000,
            submit_timeout_ms: 2000,
            connect_max_attempts: 100,
            connect_retry_secs: 3,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
