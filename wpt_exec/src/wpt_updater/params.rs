//! Waypoint updater parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::WptUpdaterError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the waypoint updater
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Params {
    /// Number of waypoints ahead of the vehicle to publish.
    pub lookahead_wpts: usize,

    /// Gain mapping the remaining distance to the stop point onto a target speed.
    ///
    /// Units: (meters/second)/meter
    pub max_decel: f64,

    /// Number of waypoints short of the stop line at which the vehicle's localisation reference
    /// point should stop, so that the front of the vehicle stays behind the line.
    pub stop_safety_offset_wpts: usize,

    /// Target speeds below this are set to exactly zero while stopping.
    ///
    /// Units: meters/second
    pub stop_speed_threshold_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            lookahead_wpts: 30,
            max_decel: 0.75,
            stop_safety_offset_wpts: 3,
            stop_speed_threshold_ms: 1.0,
        }
    }
}

impl Params {
    /// Check that the parameters are usable.
    pub fn validate(&self) -> Result<(), WptUpdaterError> {
        if self.lookahead_wpts == 0 {
            return Err(WptUpdaterError::InvalidParam(
                "lookahead_wpts",
                "must be at least 1".into(),
            ));
        }

        if !(self.max_decel.is_finite() && self.max_decel > 0.0) {
            return Err(WptUpdaterError::InvalidParam(
                "max_decel",
                format!("must be finite and positive, found {}", self.max_decel),
            ));
        }

        if !(self.stop_speed_threshold_ms.is_finite() && self.stop_speed_threshold_ms >= 0.0) {
            return Err(WptUpdaterError::InvalidParam(
                "stop_speed_threshold_ms",
                format!(
                    "must be finite and non-negative, found {}",
                    self.stop_speed_threshold_ms
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_params_file() {
        // Matches the shipped params/wpt_updater.toml
        let params: Params = util::params::from_str(
            "lookahead_wpts = 30\n\
            max_decel = 0.75\n\
            stop_safety_offset_wpts = 3\n\
            stop_speed_threshold_ms = 1.0\n"
        ).unwrap();

        assert_eq!(params, Params::default());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let p = Params { lookahead_wpts: 0, ..Default::default() };
        assert!(matches!(p.validate(), Err(WptUpdaterError::InvalidParam("lookahead_wpts", _))));

        let p = Params { max_decel: 0.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(WptUpdaterError::InvalidParam("max_decel", _))));

        let p = Params { max_decel: std::f64::NAN, ..Default::default() };
        assert!(p.validate().is_err());

        let p = Params { stop_speed_threshold_ms: -1.0, ..Default::default() };
        assert!(p.validate().is_err());

        // A zero safety offset and zero threshold are allowed
        let p = Params {
            stop_safety_offset_wpts: 0,
            stop_speed_threshold_ms: 0.0,
            ..Default::default()
        };
        assert!(p.validate().is_ok());
    }
}
