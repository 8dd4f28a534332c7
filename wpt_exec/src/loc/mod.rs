//! # Localisation module
//!
//! The vehicle's pose is provided externally by the localisation system, this module defines the
//! pose type used by the rest of the software and the conversions from the network messages.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::wpt::PoseMsg;
use nalgebra::{Quaternion, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Quaternions with a norm below this are considered degenerate.
const MIN_QUATERNION_NORM: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose (position and attitude) in the map frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    /// The position in the map frame
    pub position_m: Vector3<f64>,

    /// The attitude in the map frame. This is a quaternion that will rotate an object from the
    /// map frame into the body frame.
    pub attitude_q: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// A pose at the given position with identity attitude.
    pub fn from_position(x: f64, y: f64, z: f64) -> Self {
        Self {
            position_m: Vector3::new(x, y, z),
            attitude_q: UnitQuaternion::identity(),
        }
    }

    /// Get the 2D (XY plane) position.
    pub fn position2(&self) -> Vector2<f64> {
        self.position_m.xy()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::from_position(0.0, 0.0, 0.0)
    }
}

impl From<&PoseMsg> for Pose {
    /// Convert from the network message.
    ///
    /// A degenerate (zero) orientation quaternion is replaced by the identity, since only the
    /// position is needed for planning.
    fn from(msg: &PoseMsg) -> Self {
        let [x, y, z, w] = msg.orientation_q;
        let attitude_q =
            UnitQuaternion::try_new(Quaternion::new(w, x, y, z), MIN_QUATERNION_NORM)
                .unwrap_or_else(UnitQuaternion::identity);

        Self {
            position_m: Vector3::from(msg.position_m),
            attitude_q,
        }
    }
}

impl From<&Pose> for PoseMsg {
    fn from(pose: &Pose) -> Self {
        let q = pose.attitude_q.quaternion();
        Self {
            position_m: [pose.position_m[0], pose.position_m[1], pose.position_m[2]],
            orientation_q: [q.i, q.j, q.k, q.w],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_from_msg() {
        // 90 degree yaw, [x, y, z, w] ordering
        let half = FRAC_PI_2 / 2.0;
        let msg = PoseMsg {
            position_m: [1.0, 2.0, 3.0],
            orientation_q: [0.0, 0.0, half.sin(), half.cos()],
        };

        let pose = Pose::from(&msg);
        assert_eq!(pose.position2(), Vector2::new(1.0, 2.0));
        assert!((pose.attitude_q.euler_angles().2 - FRAC_PI_2).abs() < 1e-12);

        // And back again
        let back = PoseMsg::from(&pose);
        assert_eq!(back.position_m, msg.position_m);
        for (a, b) in back.orientation_q.iter().zip(msg.orientation_q.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_degenerate_orientation() {
        let msg = PoseMsg {
            position_m: [0.0, 0.0, 0.0],
            orientation_q: [0.0; 4],
        };

        assert_eq!(Pose::from(&msg).attitude_q, UnitQuaternion::identity());
    }
}
