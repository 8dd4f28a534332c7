//! # Waypoint Messages
//!
//! This module defines the messages exchanged between the waypoint updater and the rest of the
//! vehicle software. All messages are sent as JSON strings.
//!
//! Inputs (pose, base waypoints and the traffic light stop line) are multiplexed onto a single
//! stream as [`WptInput`] messages. The output is a [`Lane`] containing the final waypoints.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Value of a [`WptInput::TrafficWaypoint`] meaning there is no stop line ahead.
pub const NO_STOP_LINE: i64 = -1;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose in the map frame.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PoseMsg {
    /// Position `[x, y, z]` in meters
    pub position_m: [f64; 3],

    /// Orientation quaternion `[x, y, z, w]`
    pub orientation_q: [f64; 4],
}

/// A single waypoint, a pose plus the target longitudinal speed at that pose.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WaypointMsg {
    pub pose: PoseMsg,

    /// Target longitudinal speed in meters/second
    pub speed_ms: f64,
}

/// An ordered sequence of waypoints.
///
/// Used both for the base waypoints (the full reference path) and for the final waypoints
/// published by the waypoint updater.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Lane {
    /// UTC timestamp at which the lane was produced
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Name of the frame the waypoint poses are given in
    pub frame_id: String,

    pub waypoints: Vec<WaypointMsg>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Input messages to the waypoint updater.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum WptInput {
    /// The current pose of the vehicle
    Pose(PoseMsg),

    /// The full reference path, sent once or whenever the map is reloaded
    BaseWaypoints(Lane),

    /// Index into the base waypoints of the next stop line the vehicle must stop at, or
    /// [`NO_STOP_LINE`].
    TrafficWaypoint(i64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseMsg {
    /// A pose at the given position with identity orientation.
    pub fn from_position(position_m: [f64; 3]) -> Self {
        Self {
            position_m,
            orientation_q: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Lane {
    /// Create a new lane stamped with the current time.
    pub fn new(frame_id: &str, waypoints: Vec<WaypointMsg>) -> Self {
        Self {
            timestamp: Utc::now(),
            frame_id: frame_id.into(),
            waypoints,
        }
    }
}

impl WptInput {
    /// Build a traffic waypoint message from an optional stop line index.
    pub fn traffic_wpt(stop_line_idx: Option<usize>) -> Self {
        match stop_line_idx {
            Some(i) => WptInput::TrafficWaypoint(i as i64),
            None => WptInput::TrafficWaypoint(NO_STOP_LINE),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_input_json() {
        let msg = WptInput::traffic_wpt(None);
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"TrafficWaypoint":-1}"#);

        let pose: WptInput =
            serde_json::from_str(r#"{"Pose":{"position_m":[1.0,2.0,0.0],"orientation_q":[0.0,0.0,0.0,1.0]}}"#)
                .unwrap();
        assert_eq!(pose, WptInput::Pose(PoseMsg::from_position([1.0, 2.0, 0.0])));
    }

    #[test]
    fn test_lane_timestamp_millis() {
        let lane = Lane::new("world", vec![]);
        let json = serde_json::to_string(&lane).unwrap();
        let parsed: Lane = serde_json::from_str(&json).unwrap();

        // Sub-millisecond precision is lost on the wire
        assert_eq!(parsed.timestamp.timestamp_millis(), lane.timestamp.timestamp_millis());
        assert_eq!(parsed.frame_id, "world");
    }
}
