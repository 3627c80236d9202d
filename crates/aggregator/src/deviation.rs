//! Windowed plan-versus-history deviation.

use std::collections::HashMap;

use contracts::ReportPoint;

/// Default trailing window in seconds
pub const DEFAULT_DEVIATION_WINDOW_SECS: f64 = 60.0;

/// Average Euclidean distance between plan and history points that share the
/// exact same time value inside `[snapshot_time - window_secs, snapshot_time]`
///
/// Plan points with identical time values collapse to the last one. Returns
/// 0.0 when no pair matches, which is indistinguishable from a perfect match.
pub fn compute_avg_deviation(
    plan: &[ReportPoint],
    history: &[ReportPoint],
    snapshot_time: f64,
    window_secs: f64,
) -> f64 {
    let start = snapshot_time - window_secs;
    let in_window = |t: f64| t >= start && t <= snapshot_time;

    // Keyed by bit pattern: the join is on exact equality
    let plan_by_t: HashMap<u64, &ReportPoint> = plan
        .iter()
        .filter(|p| in_window(p.t))
        .map(|p| (p.t.to_bits(), p))
        .collect();

    let (sum, matched) = history
        .iter()
        .filter(|h| in_window(h.t))
        .filter_map(|h| {
            plan_by_t
                .get(&h.t.to_bits())
                .map(|p| p.position().distance_to(&h.position()))
        })
        .fold((0.0, 0_usize), |(sum, n), d| (sum + d, n + 1));

    if matched == 0 {
        0.0
    } else {
        sum / matched as f64
    }
}
