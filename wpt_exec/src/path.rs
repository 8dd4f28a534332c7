//! # Path
//!
//! This module defines the reference path (the base waypoints) followed by the vehicle.
//!
//! The path is circular: the waypoint after the last one is the first one, and all index
//! arithmetic on the path wraps around its length.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::loc::Pose;
use comms_if::wpt::{Lane, WaypointMsg};
use util::maths::wrap_index;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum number of waypoints in a valid path.
pub const MIN_PATH_LEN: usize = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single waypoint, a pose to drive through and the target speed at that pose.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub pose: Pose,

    /// Target longitudinal speed in meters/second
    pub speed_ms: f64,
}

/// A circular reference path made of waypoints.
///
/// Each path is tagged with a generation number, which identifies a particular load of the base
/// waypoints. Data derived from the path (such as the spatial index) records the generation it
/// was built from so that it can't be used with a different path.
#[derive(Debug, Clone, Serialize)]
pub struct Path {
    generation: u64,

    frame_id: String,

    wpts: Vec<Waypoint>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PathError {
    #[error("A path must contain at least {} waypoints, found {0}", MIN_PATH_LEN)]
    TooFewWaypoints(usize),

    #[error("The position of waypoint {0} is not finite")]
    NonFinitePosition(usize),

    #[error("The speed of waypoint {0} is not finite ({1})")]
    NonFiniteSpeed(usize, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Get the 2D (XY plane) position of the waypoint.
    pub fn position2(&self) -> Vector2<f64> {
        self.pose.position2()
    }
}

impl From<&WaypointMsg> for Waypoint {
    fn from(msg: &WaypointMsg) -> Self {
        Self {
            pose: Pose::from(&msg.pose),
            speed_ms: msg.speed_ms,
        }
    }
}

impl From<&Waypoint> for WaypointMsg {
    fn from(wpt: &Waypoint) -> Self {
        Self {
            pose: (&wpt.pose).into(),
            speed_ms: wpt.speed_ms,
        }
    }
}

impl Path {
    /// Create a new path from a sequence of waypoints.
    ///
    /// The path must contain at least [`MIN_PATH_LEN`] waypoints, all with finite positions and
    /// speeds.
    pub fn new(generation: u64, frame_id: &str, wpts: Vec<Waypoint>) -> Result<Self, PathError> {
        if wpts.len() < MIN_PATH_LEN {
            return Err(PathError::TooFewWaypoints(wpts.len()));
        }

        for (i, w) in wpts.iter().enumerate() {
            if !w.pose.position_m.iter().all(|v| v.is_finite()) {
                return Err(PathError::NonFinitePosition(i));
            }
            if !w.speed_ms.is_finite() {
                return Err(PathError::NonFiniteSpeed(i, w.speed_ms));
            }
        }

        Ok(Self {
            generation,
            frame_id: frame_id.into(),
            wpts,
        })
    }

    /// Create a new path from a base waypoints lane message.
    pub fn from_lane(generation: u64, lane: &Lane) -> Result<Self, PathError> {
        Self::new(
            generation,
            &lane.frame_id,
            lane.waypoints.iter().map(Waypoint::from).collect(),
        )
    }

    /// The generation of the base waypoints this path was created from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The name of the frame the waypoints are given in.
    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    /// Get the number of waypoints in the path
    pub fn len(&self) -> usize {
        self.wpts.len()
    }

    /// Returns `true` if there are no waypoints, which can't happen for a path built by `new`.
    pub fn is_empty(&self) -> bool {
        self.wpts.is_empty()
    }

    /// Get the waypoint at the given index, wrapping around the end of the path.
    pub fn get(&self, index: usize) -> &Waypoint {
        &self.wpts[index % self.wpts.len()]
    }

    /// All waypoints in the path, in order.
    pub fn wpts(&self) -> &[Waypoint] {
        &self.wpts
    }

    /// Index of the waypoint before `index`. The waypoint before the first is the last.
    pub fn prev_index(&self, index: usize) -> usize {
        wrap_index(index as i64 - 1, self.wpts.len())
    }

    /// Index of the waypoint after `index`. The waypoint after the last is the first.
    pub fn next_index(&self, index: usize) -> usize {
        wrap_index(index as i64 + 1, self.wpts.len())
    }

    /// The 2D (XY plane) positions of all waypoints, in order.
    pub fn positions2(&self) -> Vec<Vector2<f64>> {
        self.wpts.iter().map(Waypoint::position2).collect()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Path length along a contiguous run of waypoints.
///
/// Returns the sum of the 3D distances between consecutive waypoints walking from `start` to
/// `end` inclusive. If `end <= start` the distance is zero.
///
/// # Panics
/// - If `end` is beyond the end of `wpts` and `end > start`.
pub fn cumulative_distance(wpts: &[Waypoint], start: usize, end: usize) -> f64 {
    if end <= start {
        return 0.0;
    }

    wpts[start..=end]
        .windows(2)
        .map(|w| (w[1].pose.position_m - w[0].pose.position_m).norm())
        .sum()
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Build a straight line of waypoints along X, `sep_m` apart, all with the given speed.
    pub(crate) fn straight_wpts(num: usize, sep_m: f64, speed_ms: f64) -> Vec<Waypoint> {
        (0..num)
            .map(|i| Waypoint {
                pose: Pose::from_position(i as f64 * sep_m, 0.0, 0.0),
                speed_ms,
            })
            .collect()
    }

    /// Build a circle of waypoints, anticlockwise starting at `(radius, 0)`.
    pub(crate) fn circle_wpts(num: usize, radius_m: f64, speed_ms: f64) -> Vec<Waypoint> {
        (0..num)
            .map(|i| {
                let theta = std::f64::consts::TAU * i as f64 / num as f64;
                Waypoint {
                    pose: Pose::from_position(radius_m * theta.cos(), radius_m * theta.sin(), 0.0),
                    speed_ms,
                }
            })
            .collect()
    }

    #[test]
    fn test_path_validation() {
        assert_eq!(
            Path::new(0, "world", straight_wpts(1, 1.0, 5.0)).unwrap_err(),
            PathError::TooFewWaypoints(1)
        );
        assert_eq!(
            Path::new(0, "world", vec![]).unwrap_err(),
            PathError::TooFewWaypoints(0)
        );

        let mut wpts = straight_wpts(4, 1.0, 5.0);
        wpts[2].pose.position_m[1] = std::f64::NAN;
        assert_eq!(
            Path::new(0, "world", wpts).unwrap_err(),
            PathError::NonFinitePosition(2)
        );

        let mut wpts = straight_wpts(4, 1.0, 5.0);
        wpts[3].speed_ms = std::f64::INFINITY;
        assert!(matches!(
            Path::new(0, "world", wpts),
            Err(PathError::NonFiniteSpeed(3, _))
        ));

        let path = Path::new(7, "world", straight_wpts(2, 1.0, 5.0)).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.generation(), 7);
        assert_eq!(path.frame_id(), "world");
    }

    #[test]
    fn test_circular_indexing() {
        let path = Path::new(0, "world", straight_wpts(10, 1.0, 5.0)).unwrap();

        assert_eq!(path.prev_index(0), 9);
        assert_eq!(path.prev_index(5), 4);
        assert_eq!(path.next_index(9), 0);
        assert_eq!(path.next_index(3), 4);
        assert_eq!(path.get(12).position2(), Vector2::new(2.0, 0.0));
    }

    #[test]
    fn test_from_lane() {
        let lane = Lane::new(
            "map",
            straight_wpts(3, 2.0, 4.0).iter().map(WaypointMsg::from).collect(),
        );
        let path = Path::from_lane(1, &lane).unwrap();

        assert_eq!(path.frame_id(), "map");
        assert_eq!(path.positions2()[2], Vector2::new(4.0, 0.0));
        assert_eq!(path.get(1).speed_ms, 4.0);
    }

    #[test]
    fn test_cumulative_distance_unit_spacing() {
        let wpts = straight_wpts(10, 1.0, 5.0);

        for i in 0..10 {
            for j in i..10 {
                assert!((cumulative_distance(&wpts, i, j) - (j - i) as f64).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cumulative_distance_3d_and_reversed() {
        let mut wpts = straight_wpts(3, 3.0, 5.0);
        wpts[1].pose.position_m[2] = 4.0;

        // 3-4-5 triangles
        assert_eq!(cumulative_distance(&wpts, 0, 1), 5.0);
        assert_eq!(cumulative_distance(&wpts, 0, 2), 10.0);

        // Reversed and empty walks have no length
        assert_eq!(cumulative_distance(&wpts, 2, 0), 0.0);
        assert_eq!(cumulative_distance(&wpts, 1, 1), 0.0);
    }
}
