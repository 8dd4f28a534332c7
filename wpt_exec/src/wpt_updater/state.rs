//! Implementations for the WptUpdater state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{
    localiser, speed_profile, window, BaseWaypoints, NotReady, Params, WptUpdaterError,
};
use crate::{
    loc::Pose,
    path::Waypoint,
};
use comms_if::wpt::{Lane, WaypointMsg};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Waypoint updater module state
#[derive(Default)]
pub struct WptUpdater {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Last out of range stop line index that was warned about
    rejected_stop_line_idx: Option<usize>,
}

/// Input data to the waypoint updater, a snapshot of the latest inputs.
#[derive(Default, Clone)]
pub struct InputData {
    /// Latest vehicle pose
    pub pose: Option<Pose>,

    /// Latest base waypoints and their spatial index
    pub base_wpts: Option<Arc<BaseWaypoints>>,

    /// Index into the base waypoints of the next stop line, or `None` if there isn't one.
    pub stop_line_idx: Option<usize>,
}

/// The final waypoints produced on one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct FinalWpts {
    /// Generation of the base waypoints these were taken from
    pub generation: u64,

    pub frame_id: String,

    pub wpts: Vec<Waypoint>,
}

/// Status report for WptUpdater processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Elapsed session time at which the report was made
    pub time_s: f64,

    pub generation: u64,

    pub nearest_idx: usize,

    pub ahead_idx: usize,

    /// Base waypoint index of the stop line being used, if any
    pub stop_line_idx: Option<usize>,

    /// Index within the window at which the vehicle will stop, if it's stopping
    pub stop_local_idx: Option<usize>,

    pub num_wpts: usize,

    pub min_speed_ms: f64,

    pub max_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WptUpdater {
    /// Create a new waypoint updater from already loaded parameters, without archiving.
    pub fn with_params(params: Params) -> Result<Self, WptUpdaterError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Check the stop line index against the path, treating out of range indices as no stop
    /// line.
    fn check_stop_line(&mut self, stop_line_idx: Option<usize>, path_len: usize) -> Option<usize> {
        match stop_line_idx {
            Some(i) if i >= path_len => {
                if self.rejected_stop_line_idx != Some(i) {
                    warn!(
                        "Stop line index {} is outside the base waypoints ({} waypoints), \
                        ignoring it",
                        i, path_len
                    );
                    self.rejected_stop_line_idx = Some(i);
                }
                None
            }
            idx => {
                self.rejected_stop_line_idx = None;
                idx
            }
        }
    }
}

impl State for WptUpdater {
    type InitData = &'static str;
    type InitError = WptUpdaterError;

    type InputData = InputData;
    type OutputData = FinalWpts;
    type StatusReport = StatusReport;
    type ProcError = WptUpdaterError;

    /// Initialise the WptUpdater module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(WptUpdaterError::ParamLoadError)?;
        self.params.validate()?;

        info!("WptUpdater parameters: {:?}", self.params);

        self.arch_report = Archiver::from_path(session, "wpt_updater/status_report.csv")
            .map_err(WptUpdaterError::ArchiveError)?;

        Ok(())
    }

    /// Produce the final waypoints for this cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        let pose = input_data
            .pose
            .ok_or(WptUpdaterError::NotReady(NotReady::NoPose))?;
        let base = input_data
            .base_wpts
            .as_ref()
            .ok_or(WptUpdaterError::NotReady(NotReady::NoBaseWpts))?;
        let path = base.path();

        let loc = localiser::locate(&pose, base.index(), path)?;

        let mut wpts = window::extract(path, loc.ahead_idx, self.params.lookahead_wpts);

        let stop_line_idx = self.check_stop_line(input_data.stop_line_idx, path.len());
        let stop_local_idx = speed_profile::profile(
            &mut wpts,
            loc.ahead_idx,
            stop_line_idx,
            path.len(),
            &self.params,
        );

        self.report = StatusReport {
            time_s: util::session::get_elapsed_seconds(),
            generation: path.generation(),
            nearest_idx: loc.nearest_idx,
            ahead_idx: loc.ahead_idx,
            stop_line_idx,
            stop_local_idx,
            num_wpts: wpts.len(),
            min_speed_ms: wpts.iter().map(|w| w.speed_ms).fold(std::f64::INFINITY, f64::min),
            max_speed_ms: wpts.iter().map(|w| w.speed_ms).fold(std::f64::NEG_INFINITY, f64::max),
        };

        trace!(
            "Final waypoint speeds: {:?}",
            wpts.iter().map(|w| w.speed_ms).collect::<Vec<_>>()
        );

        Ok((
            FinalWpts {
                generation: path.generation(),
                frame_id: path.frame_id().into(),
                wpts,
            },
            self.report,
        ))
    }
}

impl Archived for WptUpdater {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl FinalWpts {
    /// Convert into a lane message stamped with the current time.
    pub fn to_lane(&self) -> Lane {
        Lane::new(
            &self.frame_id,
            self.wpts.iter().map(WaypointMsg::from).collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::{test::straight_wpts, Path};

    fn straight_base(num: usize) -> Arc<BaseWaypoints> {
        let path = Path::new(1, "world", straight_wpts(num, 1.0, 5.0)).unwrap();
        Arc::new(BaseWaypoints::from_path(path).unwrap())
    }

    fn updater(lookahead_wpts: usize) -> WptUpdater {
        WptUpdater::with_params(Params {
            lookahead_wpts,
            max_decel: 1.0,
            stop_safety_offset_wpts: 0,
            stop_speed_threshold_ms: 1.0,
        })
        .unwrap()
    }

    #[test]
    fn test_not_ready() {
        let mut wu = updater(10);

        let input = InputData::default();
        assert!(matches!(
            wu.proc(&input),
            Err(WptUpdaterError::NotReady(NotReady::NoPose))
        ));

        let input = InputData {
            pose: Some(Pose::default()),
            ..Default::default()
        };
        assert!(matches!(
            wu.proc(&input),
            Err(WptUpdaterError::NotReady(NotReady::NoBaseWpts))
        ));
    }

    #[test]
    fn test_proc_stop() {
        let mut wu = updater(10);
        let input = InputData {
            pose: Some(Pose::from_position(0.0, 0.0, 0.0)),
            base_wpts: Some(straight_base(10)),
            stop_line_idx: Some(6),
        };

        let (out, report) = wu.proc(&input).unwrap();

        assert_eq!(
            out.wpts.iter().map(|w| w.speed_ms).collect::<Vec<_>>(),
            vec![5.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(out.frame_id, "world");
        assert_eq!(report.ahead_idx, 0);
        assert_eq!(report.stop_local_idx, Some(6));
        assert_eq!(report.num_wpts, 10);
        assert_eq!(report.min_speed_ms, 0.0);
        assert_eq!(report.max_speed_ms, 5.0);
    }

    #[test]
    fn test_proc_cruise_and_window() {
        let mut wu = updater(5);
        let input = InputData {
            pose: Some(Pose::from_position(12.3, 0.2, 0.0)),
            base_wpts: Some(straight_base(20)),
            stop_line_idx: None,
        };

        let (out, report) = wu.proc(&input).unwrap();

        assert_eq!(report.nearest_idx, 12);
        assert_eq!(report.ahead_idx, 13);
        assert_eq!(out.wpts.len(), 5);
        assert_eq!(out.wpts[0].pose.position_m[0], 13.0);
        assert!(out.wpts.iter().all(|w| w.speed_ms == 5.0));
    }

    #[test]
    fn test_proc_past_stop_line() {
        let mut wu = updater(5);
        let input = InputData {
            pose: Some(Pose::from_position(12.3, 0.2, 0.0)),
            base_wpts: Some(straight_base(20)),
            stop_line_idx: Some(12),
        };

        let (out, report) = wu.proc(&input).unwrap();

        assert_eq!(report.ahead_idx, 13);
        assert_eq!(report.stop_local_idx, Some(0));
        assert!(out.wpts.iter().all(|w| w.speed_ms == 0.0));
    }

    #[test]
    fn test_out_of_range_stop_line() {
        let mut wu = updater(10);
        let input = InputData {
            pose: Some(Pose::from_position(0.0, 0.0, 0.0)),
            base_wpts: Some(straight_base(10)),
            stop_line_idx: Some(10),
        };

        let (out, report) = wu.proc(&input).unwrap();

        assert_eq!(report.stop_line_idx, None);
        assert!(out.wpts.iter().all(|w| w.speed_ms == 5.0));
    }

    #[test]
    fn test_to_lane() {
        let out = FinalWpts {
            generation: 0,
            frame_id: "world".into(),
            wpts: straight_wpts(3, 1.0, 2.0),
        };
        let lane = out.to_lane();

        assert_eq!(lane.frame_id, "world");
        assert_eq!(lane.waypoints.len(), 3);
        assert_eq!(lane.waypoints[2].pose.position_m, [2.0, 0.0, 0.0]);
        assert_eq!(lane.waypoints[2].speed_ms, 2.0);
    }
}
