//! # Final Waypoints Server
//!
//! Publishes the final waypoints produced by the waypoint updater each cycle, as a JSON
//! [`Lane`](comms_if::wpt::Lane).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions};

use crate::wpt_updater::FinalWpts;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Final waypoints server
pub struct FinalWptsServer {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FinalWptsServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send the final waypoints: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the final waypoints: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FinalWptsServer {
    /// Create a new instance of the final waypoints server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, FinalWptsServerError> {
        let socket_options = SocketOptions::publisher();

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.final_wpts_endpoint,
        )
        .map_err(FinalWptsServerError::SocketError)?;

        Ok(Self { socket })
    }

    /// Returns `true` if at least one subscriber has connected.
    pub fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    /// Publish the final waypoints.
    pub fn send(&mut self, final_wpts: &FinalWpts) -> Result<(), FinalWptsServerError> {
        let lane_string = serde_json::to_string(&final_wpts.to_lane())
            .map_err(FinalWptsServerError::SerializationError)?;

        self.socket
            .send(lane_string.as_str(), 0)
            .map_err(FinalWptsServerError::SendError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{
        thread,
        time::{Duration, Instant},
    };

    #[test]
    fn test_subscriber_connection() {
        let ctx = zmq::Context::new();
        let params = NetParams {
            input_endpoint: "tcp://127.0.0.1:5290".into(),
            final_wpts_endpoint: "tcp://127.0.0.1:5291".into(),
        };

        let server = FinalWptsServer::new(&ctx, &params).unwrap();
        assert!(!server.is_connected());

        let sub = ctx.socket(zmq::SUB).unwrap();
        sub.connect(&params.final_wpts_endpoint).unwrap();

        let start = Instant::now();
        while !server.is_connected() && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(server.is_connected());
    }
}
