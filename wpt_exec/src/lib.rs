//! # Waypoint updater library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the waypoint executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - the shared inputs and the state kept between cycles
pub mod data_store;

/// Final waypoints server - publishes the waypoints for the vehicle to follow
pub mod final_wpts_server;

/// Input client - receives the pose, base waypoints and stop line
pub mod input_client;

/// Localisation module - the pose of the vehicle
pub mod loc;

/// Executable parameters
pub mod params;

/// Path module - waypoints and the circular base path
pub mod path;

/// Waypoint updater module - produces the final waypoints each cycle
pub mod wpt_updater;
