//! Snapshot rendering.

use contracts::{RoleName, SubSnapshot, TrajectoryPoint, TravelPlanEntry};

/// Render one role's current state
///
/// `name` and `role` both carry the role label; no separate display name is
/// tracked.
pub(crate) fn render_role(
    role: RoleName,
    points: &[TrajectoryPoint],
    new_reports: i64,
    avg_deviation: f64,
) -> SubSnapshot {
    SubSnapshot {
        name: role.clone(),
        new_reports,
        role,
        travel_plan: points.iter().map(TravelPlanEntry::from).collect(),
        avg_deviation,
    }
}
