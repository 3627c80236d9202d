//! Report - flat upstream telemetry message
//!
//! A report carries up to three role slots (sub0/sub1/sub2), each with an
//! unordered plan list and a history list, plus per-role "new reports" stats.
//! Every field is optional on the wire and unknown fields are ignored.
//! Null numbers read as 0.0; null list elements are skipped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{instant_from_secs_f64, Position, Timestamped, TrajectoryPoint};

/// Single report point (`t` in fractional Unix seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPoint {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub t: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub z: f64,
}

impl ReportPoint {
    pub fn new(t: f64, x: f64, y: f64, z: f64) -> Self {
        Self { t, x, y, z }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    /// Report points never carry orientation
    pub fn to_trajectory_point(&self) -> TrajectoryPoint {
        TrajectoryPoint::new(self.timestamp(), self.position())
    }
}

impl Timestamped for ReportPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        instant_from_secs_f64(self.t)
    }
}

/// Flat telemetry report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub report_id: Option<i64>,
    #[serde(default)]
    pub identity_of_sender: Option<i64>,
    #[serde(default)]
    pub identity_role: Option<String>,
    /// role -> new report count; null counts are ignored
    #[serde(default)]
    pub report_stats: Option<HashMap<String, Option<i64>>>,
    /// Snapshot send time (fractional Unix seconds)
    #[serde(default)]
    pub snapshot_sent_time: Option<f64>,

    #[serde(default)]
    pub sub0_role: Option<String>,
    #[serde(default)]
    pub sub1_role: Option<String>,
    #[serde(default)]
    pub sub2_role: Option<String>,

    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub0_plan: Option<Vec<ReportPoint>>,
    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub1_plan: Option<Vec<ReportPoint>>,
    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub2_plan: Option<Vec<ReportPoint>>,

    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub0_history: Option<Vec<ReportPoint>>,
    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub1_history: Option<Vec<ReportPoint>>,
    #[serde(default, deserialize_with = "crate::wire::skip_null_elements")]
    pub sub2_history: Option<Vec<ReportPoint>>,

    // Carried upstream; accepted but not interpreted here
    #[serde(default)]
    pub logged_dwell_time: Option<i64>,
    #[serde(default)]
    pub master_epoch: Option<i64>,
    #[serde(default)]
    pub slot: Option<i32>,
}

/// Borrowed view of one role slot inside a report
#[derive(Debug, Clone, Copy)]
pub struct ReportSlot<'a> {
    pub role: Option<&'a str>,
    pub plan: Option<&'a [ReportPoint]>,
    pub history: Option<&'a [ReportPoint]>,
}

impl Report {
    /// The three role slots in wire order (sub0, sub1, sub2)
    pub fn slots(&self) -> [ReportSlot<'_>; 3] {
        [
            ReportSlot {
                role: self.sub0_role.as_deref(),
                plan: self.sub0_plan.as_deref(),
                history: self.sub0_history.as_deref(),
            },
            ReportSlot {
                role: self.sub1_role.as_deref(),
                plan: self.sub1_plan.as_deref(),
                history: self.sub1_history.as_deref(),
            },
            ReportSlot {
                role: self.sub2_role.as_deref(),
                plan: self.sub2_plan.as_deref(),
                history: self.sub2_history.as_deref(),
            },
        ]
    }

    /// Snapshot send time, 0.0 when absent
    pub fn snapshot_time(&self) -> f64 {
        self.snapshot_sent_time.unwrap_or_default()
    }

    /// Non-null `(role, count)` pairs from `report_stats`
    pub fn stats(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.report_stats
            .iter()
            .flatten()
            .filter_map(|(role, count)| count.map(|c| (role.as_str(), c)))
    }
}
