//! Per-role telemetry aggregation.
//!
//! Two upstream shapes feed the same per-role buffers:
//!
//! - reports accumulate: plan points are appended and left to expire
//! - plans supersede: a newer version stamp replaces the buffer wholesale
//!
//! Role state lives in independent maps, so a snapshot may observe a buffer
//! update before the matching deviation update.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use contracts::{
    AggregateSnapshot, AggregationConfig, PlanBlock, PlanMessage, Report, ReportPoint, RoleName,
    SubSnapshot, TrajectoryPoint,
};
use observability::metrics::{self, IngestStats, IngestSummary, PlanBlockOutcome};
use parking_lot::Mutex;
use tracing::{debug, instrument, trace};

use crate::buffer::TimeWindowBuffer;
use crate::clock::{Clock, SystemClock};
use crate::deviation::compute_avg_deviation;
use crate::role_map::RoleMap;
use crate::snapshot::render_role;

/// Buffer type held for every role
pub type PlanBuffer = TimeWindowBuffer<TrajectoryPoint>;

/// Last accepted plan stamp; the mutex also serializes the version gate
type PlanGate = Arc<Mutex<Option<DateTime<Utc>>>>;

/// Summary of one report ingestion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    /// Role of the sending agent, if it identified itself
    pub sender_role: Option<String>,
    /// Number of non-null stats entries written
    pub stats_updated: usize,
    /// Roles whose buffer received points, in slot order
    pub roles_appended: Vec<RoleName>,
    pub points_appended: usize,
}

/// Summary of one plan ingestion; absent blocks appear in no list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOutcome {
    pub accepted: Vec<RoleName>,
    pub stale: Vec<RoleName>,
    pub empty: Vec<RoleName>,
}

impl PlanOutcome {
    /// Whether any role buffer was replaced
    pub fn changed(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Telemetry aggregation engine
///
/// All operations take `&self`; share it behind an `Arc`.
pub struct TelemetryAggregator {
    /// Trailing deviation window in seconds
    window_secs: f64,
    clock: Arc<dyn Clock>,
    /// Per-role trajectory buffers; membership defines the tracked roles
    buffers: RoleMap<Arc<PlanBuffer>>,
    /// Per-role upstream "new reports" counter
    new_reports: RoleMap<i64>,
    /// Per-role last computed average deviation
    deviations: RoleMap<f64>,
    /// Per-role plan version gate
    plan_stamps: RoleMap<PlanGate>,
    stats: Mutex<IngestStats>,
}

impl fmt::Debug for TelemetryAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetryAggregator")
            .field("window_secs", &self.window_secs)
            .field("roles", &self.buffers.len())
            .finish()
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new(&AggregationConfig::default())
    }
}

impl TelemetryAggregator {
    /// Create an aggregator driven by the wall clock
    pub fn new(config: &AggregationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an aggregator whose buffers expire against `clock`
    pub fn with_clock(config: &AggregationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_secs: config.deviation_window_secs,
            clock,
            buffers: RoleMap::new(),
            new_reports: RoleMap::new(),
            deviations: RoleMap::new(),
            plan_stamps: RoleMap::new(),
            stats: Mutex::new(IngestStats::new()),
        }
    }

    /// Apply a flat report
    ///
    /// Stats overwrite the per-role counters. Each slot with a role and a
    /// non-empty plan list appends its points; nothing is ever replaced.
    #[instrument(
        level = "debug",
        name = "aggregator_ingest_report",
        skip(self, report),
        fields(report_id = ?report.report_id, sender = ?report.identity_role)
    )]
    pub fn ingest_report(&self, report: &Report) -> ReportOutcome {
        let mut outcome = ReportOutcome {
            sender_role: report.identity_role.clone(),
            ..Default::default()
        };

        for (role, count) in report.stats() {
            self.new_reports.insert(role, count);
            outcome.stats_updated += 1;
        }

        for slot in report.slots() {
            let (Some(role), Some(plan)) = (slot.role, slot.plan) else {
                continue;
            };
            if plan.is_empty() {
                continue;
            }

            let buffer = self.buffer(role);
            let appended = buffer.add_all(plan.iter().map(ReportPoint::to_trajectory_point));
            metrics::record_points_appended(role, appended);
            metrics::record_buffer_depth(role, buffer.len());

            outcome.roles_appended.push(RoleName::new(role));
            outcome.points_appended += appended;
        }

        metrics::record_report_ingested(report.identity_role.as_deref());
        self.stats
            .lock()
            .record_report(outcome.points_appended, outcome.stats_updated);

        debug!(
            stats_updated = outcome.stats_updated,
            roles = outcome.roles_appended.len(),
            points = outcome.points_appended,
            "report ingested"
        );
        outcome
    }

    /// Recompute the average deviation for every slot carrying a role, a plan
    /// list and a history list
    ///
    /// Returns the number of roles updated.
    #[instrument(level = "debug", name = "aggregator_apply_deviation", skip(self, report))]
    pub fn apply_avg_deviation(&self, report: &Report) -> usize {
        let snapshot_time = report.snapshot_time();
        let mut updated = 0;

        for slot in report.slots() {
            let (Some(role), Some(plan), Some(history)) = (slot.role, slot.plan, slot.history)
            else {
                continue;
            };

            let avg = compute_avg_deviation(plan, history, snapshot_time, self.window_secs);
            self.deviations.insert(role, avg);
            metrics::record_avg_deviation(role, avg);
            self.stats.lock().record_deviation(avg);

            trace!(role, avg, "deviation updated");
            updated += 1;
        }

        updated
    }

    /// Apply a versioned plan message
    ///
    /// Each present block passes through its role's version gate; only a
    /// newer stamp with at least one well-formed pose replaces the buffer.
    #[instrument(level = "debug", name = "aggregator_ingest_plan", skip(self, plan))]
    pub fn ingest_plan(&self, plan: &PlanMessage) -> PlanOutcome {
        let mut outcome = PlanOutcome::default();

        for (role, block) in plan.blocks() {
            let Some(block) = block else {
                continue;
            };

            let result = self.apply_plan_block(role, block);
            metrics::record_plan_block(role, result);
            self.stats.lock().record_plan(result);

            let role = RoleName::new(role);
            match result {
                PlanBlockOutcome::Accepted => outcome.accepted.push(role),
                PlanBlockOutcome::Stale => outcome.stale.push(role),
                PlanBlockOutcome::Empty => outcome.empty.push(role),
            }
        }

        debug!(
            accepted = outcome.accepted.len(),
            stale = outcome.stale.len(),
            empty = outcome.empty.len(),
            "plan ingested"
        );
        outcome
    }

    fn apply_plan_block(&self, role: &str, block: &PlanBlock) -> PlanBlockOutcome {
        let stamp = block.stamp();
        let gate = self.plan_stamps.get_or_insert_with(role, PlanGate::default);

        // Held across check, replace and update
        let mut last = gate.lock();
        if let Some(prev) = *last {
            if stamp <= prev {
                trace!(role, %stamp, %prev, "stale plan block ignored");
                return PlanBlockOutcome::Stale;
            }
        }

        let points = block.trajectory_points();
        if points.is_empty() {
            trace!(role, %stamp, "plan block has no poses");
            return PlanBlockOutcome::Empty;
        }

        let buffer = self.buffer(role);
        buffer.replace_all(points);
        *last = Some(stamp);

        metrics::record_buffer_depth(role, buffer.len());
        PlanBlockOutcome::Accepted
    }

    /// Render all tracked roles, ascending by name
    pub fn build_snapshot(&self) -> AggregateSnapshot {
        let subs: Vec<SubSnapshot> = self
            .buffers
            .sorted_keys()
            .into_iter()
            .filter_map(|role| {
                let buffer = self.buffers.get(&role)?;
                let new_reports = self.new_reports.get(&role).unwrap_or(0);
                let avg_deviation = self.deviations.get(&role).unwrap_or(0.0);
                Some(render_role(
                    role,
                    &buffer.snapshot(),
                    new_reports,
                    avg_deviation,
                ))
            })
            .collect();

        AggregateSnapshot {
            num_subs: subs.len(),
            subs,
            events: Vec::new(),
        }
    }

    /// Number of roles with a buffer
    #[inline]
    pub fn role_count(&self) -> usize {
        self.buffers.len()
    }

    /// Current buffer contents for `role`
    pub fn plan_points(&self, role: &str) -> Option<Vec<TrajectoryPoint>> {
        self.buffers.get(role).map(|buffer| buffer.snapshot())
    }

    pub fn new_reports(&self, role: &str) -> Option<i64> {
        self.new_reports.get(role)
    }

    pub fn avg_deviation(&self, role: &str) -> Option<f64> {
        self.deviations.get(role)
    }

    /// Last accepted plan stamp for `role`
    pub fn plan_stamp(&self, role: &str) -> Option<DateTime<Utc>> {
        self.plan_stamps.get(role).and_then(|gate| *gate.lock())
    }

    #[inline]
    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Running ingestion tallies since start
    pub fn ingest_summary(&self) -> IngestSummary {
        self.stats.lock().summary()
    }

    fn buffer(&self, role: &str) -> Arc<PlanBuffer> {
        self.buffers.get_or_insert_with(role, || {
            Arc::new(TimeWindowBuffer::with_clock(self.clock.clone()))
        })
    }
}
