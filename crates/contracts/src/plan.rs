//! Plan - versioned upstream trajectory plan
//!
//! Each named block (mid/sub1/sub2) carries a header stamp used as a version
//! marker and a list of paths made of stamped poses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{instant_from_parts, Orientation, Position, TrajectoryPoint};

/// Role names bound to the three plan blocks, in wire order
pub const PLAN_BLOCK_ROLES: [&str; 3] = ["mid", "sub1", "sub2"];

/// Versioned plan message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanMessage {
    #[serde(default)]
    pub mid_plan: Option<PlanBlock>,
    #[serde(default)]
    pub sub1_plan: Option<PlanBlock>,
    #[serde(default)]
    pub sub2_plan: Option<PlanBlock>,
}

impl PlanMessage {
    /// `(role, block)` pairs in wire order
    pub fn blocks(&self) -> [(&'static str, Option<&PlanBlock>); 3] {
        [
            (PLAN_BLOCK_ROLES[0], self.mid_plan.as_ref()),
            (PLAN_BLOCK_ROLES[1], self.sub1_plan.as_ref()),
            (PLAN_BLOCK_ROLES[2], self.sub2_plan.as_ref()),
        ]
    }
}

/// Plan for one role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanBlock {
    #[serde(default)]
    pub header: Option<PlanHeader>,
    #[serde(default)]
    pub paths: Option<Vec<Option<PlanPath>>>,
}

impl PlanBlock {
    /// Version stamp of this block; the Unix epoch when the header has none
    pub fn stamp(&self) -> DateTime<Utc> {
        stamp_of(self.header.as_ref())
    }

    /// Every well-formed pose across every path, in wire order
    ///
    /// Null paths, null pose lists, and poses without a position are skipped.
    pub fn trajectory_points(&self) -> Vec<TrajectoryPoint> {
        self.paths
            .iter()
            .flatten()
            .flatten()
            .filter_map(|path| path.poses.as_ref())
            .flatten()
            .flatten()
            .filter_map(PoseStamped::to_trajectory_point)
            .collect()
    }
}

/// Message header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanHeader {
    #[serde(default)]
    pub stamp: Option<PlanStamp>,
    #[serde(default)]
    pub frame_id: Option<String>,
}

/// `{sec, nanosec}` stamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStamp {
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub sec: i64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub nanosec: i32,
}

impl PlanStamp {
    pub fn new(sec: i64, nanosec: i32) -> Self {
        Self { sec, nanosec }
    }

    pub fn to_instant(&self) -> DateTime<Utc> {
        instant_from_parts(self.sec, i64::from(self.nanosec))
    }
}

/// One path inside a plan block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanPath {
    #[serde(default)]
    pub header: Option<PlanHeader>,
    #[serde(default)]
    pub poses: Option<Vec<Option<PoseStamped>>>,
}

/// Stamped pose
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseStamped {
    #[serde(default)]
    pub header: Option<PlanHeader>,
    #[serde(default)]
    pub pose: Option<Pose>,
}

impl PoseStamped {
    /// Pose time; the Unix epoch when the header has no stamp
    pub fn instant(&self) -> DateTime<Utc> {
        stamp_of(self.header.as_ref())
    }

    /// `None` when the pose or its position is missing
    pub fn to_trajectory_point(&self) -> Option<TrajectoryPoint> {
        let pose = self.pose.as_ref()?;
        let position = pose.position?;
        Some(TrajectoryPoint {
            timestamp: self.instant(),
            position,
            orientation: pose.orientation,
        })
    }
}

/// Position plus optional orientation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

fn stamp_of(header: Option<&PlanHeader>) -> DateTime<Utc> {
    header
        .and_then(|h| h.stamp)
        .map(|s| s.to_instant())
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_JSON: &str = r#"{
        "mid_plan": {
            "header": {"stamp": {"sec": 100, "nanosec": 5}, "frame_id": "map"},
            "paths": [
                {"poses": [
                    {"header": {"stamp": {"sec": 101, "nanosec": 0}},
                     "pose": {"position": {"x": 1, "y": 2, "z": 3},
                              "orientation": {"x": 0, "y": 0, "z": 0, "w": 1}}},
                    {"header": {"stamp": {"sec": 102, "nanosec": 0}},
                     "pose": {"position": {"x": 4, "y": 5, "z": 6}}},
                    {"pose": {"orientation": {"x": 0, "y": 0, "z": 0, "w": 1}}},
                    null
                ]},
                null,
                {"poses": null}
            ]
        },
        "sub2_plan": {"paths": []}
    }"#;

    #[test]
    fn test_blocks_bind_roles() {
        let plan: PlanMessage = serde_json::from_str(PLAN_JSON).unwrap();
        let blocks = plan.blocks();
        assert_eq!(blocks[0].0, "mid");
        assert!(blocks[0].1.is_some());
        assert_eq!(blocks[1].0, "sub1");
        assert!(blocks[1].1.is_none());
        assert_eq!(blocks[2].0, "sub2");
        assert!(blocks[2].1.is_some());
    }

    #[test]
    fn test_flatten_skips_malformed_poses() {
        let plan: PlanMessage = serde_json::from_str(PLAN_JSON).unwrap();
        let block = plan.mid_plan.unwrap();
        assert_eq!(block.stamp(), PlanStamp::new(100, 5).to_instant());

        let points = block.trajectory_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp(), 101);
        assert_eq!(points[0].position, Position::new(1.0, 2.0, 3.0));
        assert_eq!(
            points[0].orientation,
            Some(Orientation {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                w: 1.0
            })
        );
        assert_eq!(points[1].timestamp.timestamp(), 102);
        assert!(points[1].orientation.is_none());
    }

    #[test]
    fn test_missing_header_is_epoch() {
        let block = PlanBlock::default();
        assert_eq!(block.stamp(), DateTime::UNIX_EPOCH);
        assert!(block.trajectory_points().is_empty());

        let pose = PoseStamped {
            header: None,
            pose: Some(Pose {
                position: Some(Position::new(1.0, 1.0, 1.0)),
                orientation: None,
            }),
        };
        assert_eq!(pose.instant(), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_null_numbers_keep_the_pose() {
        let json = r#"{"mid_plan": {
            "header": {"stamp": {"sec": 10, "nanosec": null}},
            "paths": [{"poses": [{
                "header": {"stamp": {"sec": 11, "nanosec": 0}},
                "pose": {"position": {"x": 1.0, "y": null, "z": 3.0},
                         "orientation": {"x": null, "y": 0.0, "z": 0.0, "w": 1.0}}
            }]}]
        }}"#;

        let plan: PlanMessage = serde_json::from_str(json).unwrap();
        let block = plan.mid_plan.unwrap();
        assert_eq!(block.stamp(), PlanStamp::new(10, 0).to_instant());

        let points = block.trajectory_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].position, Position::new(1.0, 0.0, 3.0));
        assert_eq!(points[0].orientation.map(|o| o.x), Some(0.0));
    }
}
