//! AggregateSnapshot - transport-ready rendering of aggregation state
//!
//! Field names and order are part of the subscriber contract.

use serde::{Deserialize, Serialize};

use crate::{Orientation, Position, RoleName, TrajectoryPoint};

/// Point-in-time view of every tracked role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    /// Number of tracked roles
    pub num_subs: usize,

    /// Per-role state, sorted by role name
    #[serde(rename = "Subs")]
    pub subs: Vec<SubSnapshot>,

    /// Reserved extension field, always empty
    #[serde(rename = "Events")]
    pub events: Vec<serde_json::Value>,
}

/// Snapshot of a single role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSnapshot {
    /// Display name; only role labels are known, so this equals `role`
    pub name: RoleName,
    pub new_reports: i64,
    pub role: RoleName,
    pub travel_plan: Vec<TravelPlanEntry>,
    pub avg_deviation: f64,
}

/// One rendered trajectory point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelPlanEntry {
    /// Unix milliseconds
    pub timestamp: i64,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

impl From<&TrajectoryPoint> for TravelPlanEntry {
    fn from(point: &TrajectoryPoint) -> Self {
        Self {
            timestamp: point.timestamp.timestamp_millis(),
            position: point.position,
            orientation: point.orientation,
        }
    }
}
