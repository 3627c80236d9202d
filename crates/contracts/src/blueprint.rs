//! ServiceBlueprint - Config Loader output
//!
//! Describes the whole service: listener, aggregation window, fan-out and
//! observability settings. Every section is optional in the file.

use serde::{Deserialize, Serialize};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Aggregation engine settings
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Fan-out settings
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// Logging / metrics settings
    #[serde(default)]
    pub observability: ObservabilityOptions,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (e.g. "127.0.0.1:8080")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Shared secret expected in `X-Admin-Secret` on publishing routes
    #[serde(default)]
    pub admin_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            admin_secret: None,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Aggregation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Trailing window used by the deviation estimator (seconds)
    #[serde(default = "default_deviation_window")]
    pub deviation_window_secs: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            deviation_window_secs: default_deviation_window(),
        }
    }
}

fn default_deviation_window() -> f64 {
    60.0
}

/// Fan-out settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Per-subscriber queue depth before the subscriber is considered dead
    #[serde(default = "default_queue_capacity")]
    pub subscriber_queue_capacity: usize,

    /// SSE keep-alive interval (seconds)
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// Register a subscriber that logs every pushed event
    #[serde(default)]
    pub log_events: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_capacity: default_queue_capacity(),
            keep_alive_secs: default_keep_alive(),
            log_events: false,
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

fn default_keep_alive() -> u64 {
    15
}

/// Logging / metrics settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityOptions {
    /// Prometheus exporter port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}
