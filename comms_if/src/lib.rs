//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for the waypoint updater's inputs and outputs
pub mod wpt;

/// Network module
pub mod net;
