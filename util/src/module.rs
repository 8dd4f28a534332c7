//! Processing module interface
//!
//! Modules run by the executables' main loops (such as the waypoint updater) implement
//! [`State`]. They are initialised once at start-up and then processed once per cycle with a
//! snapshot of their inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The internal state of a cyclic processing module.
pub trait State {
    /// Data required during initialisation, usually the parameter file path.
    type InitData;
    type InitError;

    /// Inputs to one cycle of processing.
    type InputData;
    /// Outputs from one cycle of processing.
    type OutputData;
    /// Diagnostics from one cycle of processing, normally archived.
    type StatusReport;
    type ProcError;

    /// Initialise the module, loading parameters and opening archives in the given session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process a single cycle.
    ///
    /// An error means no output was produced this cycle, the module remains usable for the next.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
