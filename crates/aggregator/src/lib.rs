//! # Aggregator
//!
//! Per-role telemetry aggregation.
//!
//! - Time-windowed buffers that expire on write and keep the last point
//! - Report accumulation and versioned plan replacement
//! - Average deviation between planned and observed trajectories
//! - Snapshots sorted by role name
//!
//! ## Example
//!
//! ```ignore
//! use aggregator::TelemetryAggregator;
//!
//! let aggregator = TelemetryAggregator::new(&blueprint.aggregation);
//!
//! aggregator.ingest_report(&report);
//! aggregator.apply_avg_deviation(&report);
//! let snapshot = aggregator.build_snapshot();
//! ```

mod buffer;
mod clock;
mod deviation;
mod engine;
mod role_map;
mod snapshot;

pub use buffer::TimeWindowBuffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use deviation::{compute_avg_deviation, DEFAULT_DEVIATION_WINDOW_SECS};
pub use engine::{PlanBuffer, PlanOutcome, ReportOutcome, TelemetryAggregator};
pub use role_map::RoleMap;

// Re-export contracts types
pub use contracts::{AggregateSnapshot, AggregationConfig, PlanMessage, Report};
