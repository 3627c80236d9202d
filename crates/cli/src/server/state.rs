//! Shared runtime state for the HTTP boundary.

use std::sync::Arc;
use std::time::Duration;

use aggregator::TelemetryAggregator;
use contracts::ServiceBlueprint;
use dispatcher::{BroadcastReport, Broadcaster, DispatcherError, LogSubscriber};
use tracing::{debug, info};

/// Static service identity reported by `/health`
#[derive(Clone, Copy, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            service: "telemetry-hub",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// State handed to every handler behind an `Arc`
#[derive(Debug)]
pub struct AppState {
    pub aggregator: TelemetryAggregator,
    pub broadcaster: Broadcaster,
    pub admin_secret: Option<String>,
    pub subscriber_queue_capacity: usize,
    pub keep_alive: Duration,
    pub build: BuildInfo,
}

impl AppState {
    pub fn from_blueprint(blueprint: &ServiceBlueprint) -> Self {
        let broadcaster = Broadcaster::new();

        if blueprint.broadcast.log_events {
            let id = broadcaster.next_subscriber_id();
            broadcaster.subscribe(Arc::new(LogSubscriber::new(id, "event-log")));
            info!(subscriber = %id, "event log subscriber registered");
        }

        Self {
            aggregator: TelemetryAggregator::new(&blueprint.aggregation),
            broadcaster,
            admin_secret: blueprint.server.admin_secret.clone(),
            subscriber_queue_capacity: blueprint.broadcast.subscriber_queue_capacity,
            keep_alive: Duration::from_secs(blueprint.broadcast.keep_alive_secs),
            build: BuildInfo::default(),
        }
    }

    /// Render the current aggregate, cache it as the last payload and fan it out
    pub fn publish_snapshot(&self) -> Result<BroadcastReport, DispatcherError> {
        let snapshot = self.aggregator.build_snapshot();
        let report = self.broadcaster.broadcast(&snapshot)?;
        debug!(
            roles = snapshot.num_subs,
            delivered = report.delivered,
            pruned = report.pruned,
            "snapshot published"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_events_registers_subscriber() {
        let mut blueprint = ServiceBlueprint::default();
        let state = AppState::from_blueprint(&blueprint);
        assert_eq!(state.broadcaster.subscriber_count(), 0);

        blueprint.broadcast.log_events = true;
        let state = AppState::from_blueprint(&blueprint);
        assert_eq!(state.broadcaster.subscriber_count(), 1);
        assert_eq!(state.keep_alive, Duration::from_secs(15));
    }

    #[test]
    fn test_publish_snapshot_caches_payload() {
        let state = AppState::from_blueprint(&ServiceBlueprint::default());
        assert!(state.broadcaster.last_payload().is_none());

        state.publish_snapshot().unwrap();

        let cached = state.broadcaster.last_payload().unwrap();
        let value: serde_json::Value = serde_json::from_str(&cached).unwrap();
        assert_eq!(value["num_subs"], 0);
    }
}
