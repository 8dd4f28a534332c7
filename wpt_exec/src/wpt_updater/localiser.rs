//! Localisation of the vehicle on the base waypoints
//!
//! The nearest waypoint to the vehicle may be behind it. [`locate`] finds the nearest waypoint
//! with the spatial index and then uses [`is_behind`] to decide whether the vehicle has already
//! passed it, in which case the next waypoint is the one ahead.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{SpatialIndex, WptUpdaterError};
use crate::{loc::Pose, path::Path};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The position of the vehicle along the base waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Localisation {
    /// Index of the waypoint nearest the vehicle
    pub nearest_idx: usize,

    /// Index of the first waypoint ahead of the vehicle
    pub ahead_idx: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the first waypoint of `path` ahead of the vehicle at `pose`.
pub fn locate(
    pose: &Pose,
    index: &SpatialIndex,
    path: &Path,
) -> Result<Localisation, WptUpdaterError> {
    let position = pose.position2();
    let nearest_idx = index.query_nearest(path, &position)?;

    let closest = path.get(nearest_idx).position2();
    let prev = path.get(path.prev_index(nearest_idx)).position2();

    let ahead_idx = if is_behind(&prev, &closest, &position) {
        path.next_index(nearest_idx)
    } else {
        nearest_idx
    };

    Ok(Localisation {
        nearest_idx,
        ahead_idx,
    })
}

/// Returns `true` if `closest` is behind a vehicle at `position`, given the waypoint before it,
/// `prev`.
///
/// The waypoint is behind when the vehicle lies beyond the plane through `closest` normal to the
/// segment `prev -> closest`. A vehicle exactly on that plane is not past the waypoint.
pub fn is_behind(prev: &Vector2<f64>, closest: &Vector2<f64>, position: &Vector2<f64>) -> bool {
    (closest - prev).dot(&(position - closest)) > 0.0
}
