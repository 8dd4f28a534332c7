//! # Waypoint Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WptExecParams {
    /// Frequency of the main planning cycle.
    ///
    /// Units: Hertz
    pub cycle_frequency_hz: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WptExecParams {
    /// Get the cycle period in seconds, or `None` if the frequency isn't a finite positive
    /// number.
    pub fn cycle_period_s(&self) -> Option<f64> {
        if self.cycle_frequency_hz.is_finite() && self.cycle_frequency_hz > 0.0 {
            Some(1.0 / self.cycle_frequency_hz)
        } else {
            None
        }
    }
}
