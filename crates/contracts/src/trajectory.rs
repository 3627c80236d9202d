//! Trajectory points - the unit stored in every role buffer
//!
//! Both upstream formats normalize into [`TrajectoryPoint`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Anything that can be ordered on a time axis
pub trait Timestamped {
    /// Instant this item refers to
    fn timestamp(&self) -> DateTime<Utc>;
}

/// 3-D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Quaternion orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub z: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub w: f64,
}

/// Timestamped position with optional orientation
///
/// `orientation` is `None` when the upstream format does not carry one
/// (reports), which is distinct from a zero quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub timestamp: DateTime<Utc>,
    pub position: Position,
    pub orientation: Option<Orientation>,
}

impl TrajectoryPoint {
    /// Point without orientation
    pub fn new(timestamp: DateTime<Utc>, position: Position) -> Self {
        Self {
            timestamp,
            position,
            orientation: None,
        }
    }

    /// Point with orientation
    pub fn with_orientation(
        timestamp: DateTime<Utc>,
        position: Position,
        orientation: Orientation,
    ) -> Self {
        Self {
            timestamp,
            position,
            orientation: Some(orientation),
        }
    }
}

impl Timestamped for TrajectoryPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Convert fractional Unix seconds into an instant
///
/// Nanoseconds are rounded; a rounding carry rolls into the seconds field.
/// Values chrono cannot represent (including NaN) map to the Unix epoch.
pub fn instant_from_secs_f64(t: f64) -> DateTime<Utc> {
    let secs = t.floor();
    let mut whole = secs as i64;
    let mut nanos = ((t - secs) * NANOS_PER_SEC as f64).round() as i64;
    if nanos >= NANOS_PER_SEC {
        whole = whole.saturating_add(1);
        nanos -= NANOS_PER_SEC;
    }
    instant_from_parts(whole, nanos)
}

/// Convert a `{sec, nanosec}` pair into an instant
///
/// Out-of-range nanoseconds (negative or above one second) are normalized
/// into the seconds field.
pub fn instant_from_parts(sec: i64, nanosec: i64) -> DateTime<Utc> {
    let whole = sec.saturating_add(nanosec.div_euclid(NANOS_PER_SEC));
    let nanos = nanosec.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(whole, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}
