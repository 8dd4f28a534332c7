//! # Data Store
//!
//! The [`WptInputs`] are shared between the input client's background thread, which writes the
//! latest value of each input as it arrives, and the main loop, which takes a snapshot at the
//! start of each cycle. Each input has its own lock.
//!
//! The [`DataStore`] holds everything else the main loop needs between cycles.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::{Arc, Mutex};

use crate::{
    loc::Pose,
    wpt_updater::{self, BaseWaypoints, WptUpdater},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Latest value of each input to the waypoint updater.
#[derive(Default)]
pub struct WptInputs {
    pose: Mutex<Option<Pose>>,
    base_wpts: Mutex<Option<Arc<BaseWaypoints>>>,
    stop_line_idx: Mutex<Option<usize>>,
}

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session time at the start of the cycle
    pub cycle_time_s: f64,

    // WptUpdater
    pub wpt_updater: WptUpdater,
    pub wpt_updater_input: wpt_updater::InputData,
    pub wpt_updater_output: Option<wpt_updater::FinalWpts>,
    pub wpt_updater_status_rpt: wpt_updater::StatusReport,

    /// The reason the last cycle didn't produce any waypoints, used to log only changes.
    pub not_ready: Option<wpt_updater::NotReady>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl WptInputs {
    pub fn set_pose(&self, pose: Pose) {
        *self.pose.lock().expect("WptInputs: pose mutex poisoned") = Some(pose);
    }

    pub fn set_base_wpts(&self, base_wpts: Arc<BaseWaypoints>) {
        *self.base_wpts.lock().expect("WptInputs: base_wpts mutex poisoned") = Some(base_wpts);
    }

    pub fn set_stop_line_idx(&self, stop_line_idx: Option<usize>) {
        *self
            .stop_line_idx
            .lock()
            .expect("WptInputs: stop_line_idx mutex poisoned") = stop_line_idx;
    }

    /// The current base waypoints, if any have been received.
    pub fn base_wpts(&self) -> Option<Arc<BaseWaypoints>> {
        self.base_wpts
            .lock()
            .expect("WptInputs: base_wpts mutex poisoned")
            .clone()
    }

    /// Take a copy of the latest inputs.
    ///
    /// The base waypoints are shared rather than copied.
    pub fn snapshot(&self) -> wpt_updater::InputData {
        wpt_updater::InputData {
            pose: *self.pose.lock().expect("WptInputs: pose mutex poisoned"),
            base_wpts: self.base_wpts(),
            stop_line_idx: *self
                .stop_line_idx
                .lock()
                .expect("WptInputs: stop_line_idx mutex poisoned"),
        }
    }
}

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the previous cycle's outputs and takes a new snapshot of the inputs.
    pub fn cycle_start(&mut self, inputs: &WptInputs) {
        self.wpt_updater_input = inputs.snapshot();
        self.wpt_updater_output = None;
        self.wpt_updater_status_rpt = wpt_updater::StatusReport::default();

        self.cycle_time_s = util::session::get_elapsed_seconds();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{test::straight_wpts, Path};

    #[test]
    fn test_snapshot() {
        let inputs = WptInputs::default();

        let snap = inputs.snapshot();
        assert!(snap.pose.is_none() && snap.base_wpts.is_none() && snap.stop_line_idx.is_none());

        let base = Arc::new(
            BaseWaypoints::from_path(Path::new(2, "world", straight_wpts(4, 1.0, 1.0)).unwrap())
                .unwrap(),
        );
        inputs.set_pose(Pose::from_position(1.0, 2.0, 0.0));
        inputs.set_base_wpts(base.clone());
        inputs.set_stop_line_idx(Some(3));

        let snap = inputs.snapshot();
        assert_eq!(snap.pose, Some(Pose::from_position(1.0, 2.0, 0.0)));
        assert!(Arc::ptr_eq(snap.base_wpts.as_ref().unwrap(), &base));
        assert_eq!(snap.stop_line_idx, Some(3));

        // Later writes don't affect an earlier snapshot
        inputs.set_stop_line_idx(None);
        assert_eq!(snap.stop_line_idx, Some(3));
        assert_eq!(inputs.snapshot().stop_line_idx, None);
    }
}
