//! # Input Client
//!
//! The InputClient receives the inputs to the waypoint updater: the vehicle pose, the base
//! waypoints and the stop line index. All inputs are published as JSON [`WptInput`] messages on a
//! single endpoint, which the client subscribes to from a background thread. The latest value of
//! each input is kept in a shared [`WptInputs`] which the main loop reads from.
//!
//! Base waypoints are validated and indexed on the background thread, so the main loop never
//! pays for building the spatial index. An invalid path is rejected and the previous one kept.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{debug, error, info, warn};

use crate::{data_store::WptInputs, loc::Pose, wpt_updater::BaseWaypoints};
use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    wpt::{Lane, WptInput, NO_STOP_LINE},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct InputClient {
    bg_jh: Option<JoinHandle<()>>,
    bg_run: Arc<AtomicBool>,
    bg_alive: Arc<AtomicBool>,
    inputs: Arc<WptInputs>,
}

/// State of the input processing which persists between messages.
#[derive(Default)]
pub(crate) struct InputHandler {
    /// Generation of the last accepted base waypoints
    generation: u64,

    /// The last accepted base waypoints, used to ignore repeats
    last_lane: Option<Lane>,

    /// Last stop line index received, used to log only changes
    last_stop_line_idx: Option<i64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InputClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InputClient {
    /// Create a new instance of the InputClient.
    ///
    /// This function will not block until the publisher connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, InputClientError> {
        let socket_options = SocketOptions::subscriber(10);

        // Connect the socket
        let socket = MonitoredSocket::new_subscriber(ctx, socket_options, &params.input_endpoint)
            .map_err(InputClientError::SocketError)?;

        // Create the data shared objects
        let bg_run = Arc::new(AtomicBool::new(true));
        let bg_alive = Arc::new(AtomicBool::new(true));
        let inputs = Arc::new(WptInputs::default());

        // Create clones of these to pass to the bg thread
        let bg_run_clone = bg_run.clone();
        let bg_alive_clone = bg_alive.clone();
        let inputs_clone = inputs.clone();

        // Start BG thread
        let bg_jh = Some(thread::spawn(move || {
            bg_thread(socket, bg_run_clone, inputs_clone);
            bg_alive_clone.store(false, Ordering::Relaxed);
        }));

        Ok(Self {
            bg_jh,
            bg_run,
            bg_alive,
            inputs,
        })
    }

    /// The latest inputs received by the client.
    pub fn inputs(&self) -> &WptInputs {
        &self.inputs
    }

    /// Returns `false` if the background thread has stopped receiving.
    pub fn is_alive(&self) -> bool {
        self.bg_alive.load(Ordering::Relaxed)
    }
}

impl Drop for InputClient {
    fn drop(&mut self) {
        self.bg_run.store(false, Ordering::Relaxed);

        if let Some(jh) = self.bg_jh.take() {
            if jh.join().is_err() {
                warn!("InputClient background thread panicked");
            }
        }
    }
}

impl InputHandler {
    /// Apply a single input message to the shared inputs.
    pub(crate) fn handle(&mut self, input: WptInput, inputs: &WptInputs) {
        match input {
            WptInput::Pose(msg) => inputs.set_pose(Pose::from(&msg)),
            WptInput::BaseWaypoints(lane) => self.handle_base_wpts(lane, inputs),
            WptInput::TrafficWaypoint(idx) => self.handle_traffic_wpt(idx, inputs),
        }
    }

    fn handle_base_wpts(&mut self, lane: Lane, inputs: &WptInputs) {
        // The same lane may be latched and republished, the timestamp is ignored
        if let Some(ref last) = self.last_lane {
            if last.frame_id == lane.frame_id && last.waypoints == lane.waypoints {
                debug!("Received base waypoints identical to the current ones, ignoring");
                return;
            }
        }

        let generation = self.generation + 1;

        let base_wpts = match BaseWaypoints::from_lane(generation, &lane) {
            Ok(b) => b,
            Err(e) => {
                warn!("Rejected base waypoints: {}", e);
                return;
            }
        };

        info!(
            "New base waypoints (generation {}): {} waypoints in frame \"{}\"",
            generation,
            lane.waypoints.len(),
            lane.frame_id
        );

        inputs.set_base_wpts(Arc::new(base_wpts));
        util::session::save(format!("base_wpts/gen_{}.json", generation), lane.clone());

        self.generation = generation;
        self.last_lane = Some(lane);
    }

    fn handle_traffic_wpt(&mut self, idx: i64, inputs: &WptInputs) {
        let stop_line_idx = match idx {
            NO_STOP_LINE => None,
            i if i >= 0 => Some(i as usize),
            i => {
                if self.last_stop_line_idx != Some(i) {
                    warn!("Invalid stop line index {}, treating as no stop line", i);
                }
                None
            }
        };

        if self.last_stop_line_idx != Some(idx) {
            match stop_line_idx {
                Some(i) => info!("Stop line at base waypoint {}", i),
                None => info!("No stop line"),
            }
        }
        self.last_stop_line_idx = Some(idx);

        inputs.set_stop_line_idx(stop_line_idx);
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Background thread, updates the inputs when a new message is published.
fn bg_thread(socket: MonitoredSocket, run: Arc<AtomicBool>, inputs: Arc<WptInputs>) {
    let mut handler = InputHandler::default();

    // While instructed to run
    while run.load(Ordering::Relaxed) {
        // Read string from the socket
        let msg = match socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                warn!("Non UTF-8 message received by the InputClient");
                continue;
            }
            Err(zmq::Error::EAGAIN) => continue,
            Err(e) => {
                error!("Error receiving message in the InputClient: {:?}", e);
                break;
            }
        };

        // Deserialize the message
        let input: WptInput = match serde_json::from_str(&msg) {
            Ok(i) => i,
            Err(e) => {
                warn!("Could not deserialise input message: {}", e);
                continue;
            }
        };

        handler.handle(input, &inputs);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::{circle_wpts, straight_wpts};
    use comms_if::wpt::{PoseMsg, WaypointMsg};

    fn lane(wpts: &[crate::path::Waypoint]) -> Lane {
        Lane::new("world", wpts.iter().map(WaypointMsg::from).collect())
    }

    #[test]
    fn test_pose_and_stop_line() {
        let inputs = WptInputs::default();
        let mut handler = InputHandler::default();

        handler.handle(WptInput::Pose(PoseMsg::from_position([1.0, 2.0, 3.0])), &inputs);
        handler.handle(WptInput::traffic_wpt(Some(12)), &inputs);

        let snap = inputs.snapshot();
        assert_eq!(snap.pose, Some(Pose::from_position(1.0, 2.0, 3.0)));
        assert_eq!(snap.stop_line_idx, Some(12));

        // -1 clears the stop line, as does any other negative value
        handler.handle(WptInput::traffic_wpt(None), &inputs);
        assert_eq!(inputs.snapshot().stop_line_idx, None);

        handler.handle(WptInput::TrafficWaypoint(5), &inputs);
        handler.handle(WptInput::TrafficWaypoint(-7), &inputs);
        assert_eq!(inputs.snapshot().stop_line_idx, None);
    }

    #[test]
    fn test_base_wpts_generations() {
        let inputs = WptInputs::default();
        let mut handler = InputHandler::default();

        handler.handle(WptInput::BaseWaypoints(lane(&straight_wpts(10, 1.0, 5.0))), &inputs);
        let first = inputs.base_wpts().unwrap();
        assert_eq!(first.generation(), 1);

        // A repeat of the same lane is ignored
        handler.handle(WptInput::BaseWaypoints(lane(&straight_wpts(10, 1.0, 5.0))), &inputs);
        assert!(Arc::ptr_eq(&inputs.base_wpts().unwrap(), &first));

        // A new lane replaces the path and index together
        handler.handle(WptInput::BaseWaypoints(lane(&circle_wpts(20, 5.0, 5.0))), &inputs);
        let second = inputs.base_wpts().unwrap();
        assert_eq!(second.generation(), 2);
        assert_eq!(second.index().generation(), Some(2));
        assert_eq!(second.path().len(), 20);
    }

    #[test]
    fn test_degenerate_base_wpts_rejected() {
        let inputs = WptInputs::default();
        let mut handler = InputHandler::default();

        // Nothing to fall back on
        handler.handle(WptInput::BaseWaypoints(lane(&straight_wpts(1, 1.0, 5.0))), &inputs);
        assert!(inputs.base_wpts().is_none());

        // The previous path is kept
        handler.handle(WptInput::BaseWaypoints(lane(&straight_wpts(10, 1.0, 5.0))), &inputs);
        handler.handle(WptInput::BaseWaypoints(lane(&[])), &inputs);
        let base = inputs.base_wpts().unwrap();
        assert_eq!(base.generation(), 1);
        assert_eq!(base.path().len(), 10);
    }
}
