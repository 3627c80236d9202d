//! Telemetry hub metrics
//!
//! Prometheus counters and gauges for ingestion and fan-out, plus an
//! in-memory [`IngestStats`] for a summary at shutdown.

use std::fmt;

use metrics::{counter, gauge, histogram};

/// Result of applying one plan block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanBlockOutcome {
    /// Stamp advanced and buffer replaced
    Accepted,
    /// Stamp not newer than the last accepted one
    Stale,
    /// Block flattened to zero points
    Empty,
}

impl PlanBlockOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Stale => "stale",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for PlanBlockOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report accepted, labelled by sender role
pub fn record_report_ingested(sender_role: Option<&str>) {
    counter!(
        "telemetry_hub_reports_total",
        "sender_role" => sender_role.unwrap_or("unknown").to_string()
    )
    .increment(1);
}

/// One plan block applied, labelled by outcome
pub fn record_plan_block(role: &str, outcome: PlanBlockOutcome) {
    counter!(
        "telemetry_hub_plan_blocks_total",
        "role" => role.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Report points appended to a role buffer
pub fn record_points_appended(role: &str, count: usize) {
    counter!(
        "telemetry_hub_points_appended_total",
        "role" => role.to_string()
    )
    .increment(count as u64);
}

/// Buffer length after a write
pub fn record_buffer_depth(role: &str, depth: usize) {
    gauge!(
        "telemetry_hub_buffer_depth",
        "role" => role.to_string()
    )
    .set(depth as f64);
}

/// Latest average deviation for a role
pub fn record_avg_deviation(role: &str, value: f64) {
    gauge!(
        "telemetry_hub_avg_deviation",
        "role" => role.to_string()
    )
    .set(value);
    histogram!("telemetry_hub_avg_deviation_hist").record(value);
}

/// One fan-out pass
pub fn record_broadcast(delivered: usize, pruned: usize) {
    counter!("telemetry_hub_broadcasts_total").increment(1);
    counter!("telemetry_hub_deliveries_total").increment(delivered as u64);
    if pruned > 0 {
        counter!("telemetry_hub_subscribers_pruned_total").increment(pruned as u64);
    }
}

/// Live subscriber gauge
pub fn record_subscriber_count(count: usize) {
    gauge!("telemetry_hub_subscribers").set(count as f64);
}

/// In-memory ingestion tallies
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub reports: u64,
    pub points_appended: u64,
    pub stats_updates: u64,
    pub plans_accepted: u64,
    pub plans_stale: u64,
    pub plans_empty: u64,
    pub deviation: RunningStats,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_report(&mut self, points_appended: usize, stats_updates: usize) {
        self.reports += 1;
        self.points_appended += points_appended as u64;
        self.stats_updates += stats_updates as u64;
    }

    pub fn record_plan(&mut self, outcome: PlanBlockOutcome) {
        match outcome {
            PlanBlockOutcome::Accepted => self.plans_accepted += 1,
            PlanBlockOutcome::Stale => self.plans_stale += 1,
            PlanBlockOutcome::Empty => self.plans_empty += 1,
        }
    }

    pub fn record_deviation(&mut self, value: f64) {
        self.deviation.push(value);
    }

    pub fn summary(&self) -> IngestSummary {
        let plan_blocks = self.plans_accepted + self.plans_stale + self.plans_empty;
        IngestSummary {
            reports: self.reports,
            points_appended: self.points_appended,
            stats_updates: self.stats_updates,
            plans_accepted: self.plans_accepted,
            plans_rejected: self.plans_stale + self.plans_empty,
            stale_rate: if plan_blocks > 0 {
                self.plans_stale as f64 / plan_blocks as f64 * 100.0
            } else {
                0.0
            },
            deviation: StatsSummary::from(&self.deviation),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Point-in-time ingestion summary
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    pub reports: u64,
    pub points_appended: u64,
    pub stats_updates: u64,
    pub plans_accepted: u64,
    pub plans_rejected: u64,
    pub stale_rate: f64,
    pub deviation: StatsSummary,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Telemetry Ingest Summary ===")?;
        writeln!(f, "Reports: {}", self.reports)?;
        writeln!(f, "Points appended: {}", self.points_appended)?;
        writeln!(f, "Stat updates: {}", self.stats_updates)?;
        writeln!(
            f,
            "Plan blocks: {} accepted, {} rejected ({:.2}% stale)",
            self.plans_accepted, self.plans_rejected, self.stale_rate
        )?;
        writeln!(f, "Avg deviation: {}", self.deviation)?;
        Ok(())
    }
}

/// Count, mean, spread and range of a sample
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Streaming mean and variance (Welford)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
