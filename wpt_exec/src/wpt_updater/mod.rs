//! # Waypoint updater module
//!
//! The waypoint updater publishes the waypoints the vehicle should follow next. Each cycle it:
//!
//! 1. Localises the vehicle on the base waypoints, finding the first waypoint ahead of the
//!    vehicle. The nearest waypoint is found with a k-d tree over the waypoint positions, and is
//!    advanced by one if the vehicle has already passed it.
//! 1. Extracts a window of `lookahead_wpts` waypoints starting at that waypoint. The base
//!    waypoints form a loop, so the window wraps around the end of the path.
//! 1. If a stop line lies within the window, rewrites the speeds in the window so that the
//!    vehicle decelerates to a stop a few waypoints short of the line. The target speed is
//!    proportional to the path length remaining to the stop point and is never higher than the
//!    base waypoint's own speed. A vehicle that has already passed the stop line is held at
//!    zero speed.
//!
//! The base waypoints and their spatial index are held together in [`BaseWaypoints`], which is
//! replaced as a whole whenever a new path is received.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod base_wpts;
mod index;
pub mod localiser;
mod params;
pub mod speed_profile;
mod state;
pub mod window;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use base_wpts::*;
pub use index::*;
pub use params::*;
pub use state::*;

use crate::path::PathError;
use util::{archive::ArchiveError, kdtree::KdTreeError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during WptUpdater operation.
#[derive(Debug, thiserror::Error)]
pub enum WptUpdaterError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Invalid parameter {0}: {1}")]
    InvalidParam(&'static str, String),

    #[error("Could not initialise the archive: {0}")]
    ArchiveError(ArchiveError),

    #[error("Invalid base waypoints: {0}")]
    InvalidPath(PathError),

    #[error("Could not build the spatial index: {0}")]
    IndexError(KdTreeError),

    #[error("Not ready: {0}")]
    NotReady(NotReady),
}

/// The reasons the waypoint updater may not be ready to produce waypoints.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum NotReady {
    #[error("no pose has been received")]
    NoPose,

    #[error("no base waypoints have been received")]
    NoBaseWpts,

    #[error("the spatial index has not been built")]
    IndexNotBuilt,

    #[error(
        "the spatial index (generation {index_generation}) was not built from the current base \
        waypoints (generation {path_generation})"
    )]
    StaleIndex {
        index_generation: u64,
        path_generation: u64,
    },
}
