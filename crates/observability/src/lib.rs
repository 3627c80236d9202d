//! # Observability
//!
//! Logging and metrics for the telemetry hub.
//!
//! - [`init_logging`] installs the global tracing subscriber (`RUST_LOG`
//!   wins over the configured default level).
//! - [`install_prometheus`] starts the scrape endpoint; every `telemetry_hub_*`
//!   metric recorded through [`metrics`] is exported from then on.
//!
//! ```ignore
//! observability::init_logging(&LoggingConfig::for_verbosity(false, 1))?;
//! observability::install_prometheus(9100)?;
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use crate::metrics::{
    record_avg_deviation, record_broadcast, record_buffer_depth, record_plan_block,
    record_points_appended, record_report_ingested, record_subscriber_count, IngestStats,
    IngestSummary, PlanBlockOutcome, RunningStats, StatsSummary,
};

/// Log line layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, for log shippers
    #[default]
    Json,
    /// Multi-line human-readable output
    Pretty,
    /// Single-line human-readable output
    Compact,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Map `-q` / `-v` counts to a default level
    pub fn for_verbosity(quiet: bool, verbose: u8) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_level: level.to_string(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(format = ?config.format, level = %config.default_level, "logging ready");
    Ok(())
}

/// Start the Prometheus scrape endpoint on `0.0.0.0:port`
///
/// Must run inside a tokio runtime.
pub fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus exporter on port {port}"))?;

    tracing::info!(port, "Prometheus exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.default_level, "info");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(LoggingConfig::for_verbosity(false, 0).default_level, "info");
        assert_eq!(LoggingConfig::for_verbosity(false, 1).default_level, "debug");
        assert_eq!(LoggingConfig::for_verbosity(false, 3).default_level, "trace");
        assert_eq!(LoggingConfig::for_verbosity(true, 2).default_level, "warn");
    }

    #[test]
    fn test_with_format_keeps_level() {
        let config = LoggingConfig::for_verbosity(false, 1).with_format(LogFormat::Compact);
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.default_level, "debug");
    }
}
