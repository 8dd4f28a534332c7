//! # Network Module
//!
//! The waypoint updater talks to the rest of the vehicle over ZMQ publish/subscribe sockets. This
//! module provides the [`MonitoredSocket`] wrapper used for all of them, and the network
//! parameters giving their endpoints.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod monitor;
mod options;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use serde::Deserialize;
use zmq::{Context, Socket, SocketEvent, SocketType};

pub use options::SocketOptions;

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Number of monitors created so far, used to give each monitor a unique endpoint.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters, normally loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint the waypoint updater subscribes to for its inputs (pose, base waypoints and
    /// traffic waypoint), e.g. `"tcp://localhost:5100"`.
    pub input_endpoint: String,

    /// Endpoint the waypoint updater binds to in order to publish the final waypoints, e.g.
    /// `"tcp://*:5101"`.
    pub final_wpts_endpoint: String,
}

/// A zmq socket which keeps track of how many peers it is connected to.
///
/// The socket's monitor events are read by a background thread. The socket itself is available
/// through `Deref`, so it can be used exactly like a plain `zmq::Socket`.
pub struct MonitoredSocket {
    socket: Socket,

    monitor_jh: Option<thread::JoinHandle<()>>,

    shutdown: Arc<AtomicBool>,

    num_peers: Arc<AtomicUsize>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not connect the socket to {0}: {1:?}")]
    CouldNotConnect(String, Option<zmq::Error>),

    #[error("Could not read event from monitor socket: {0}")]
    EventReadError(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(&'static str, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create a new monitored socket of the given type.
    ///
    /// The socket binds to `endpoint` if `socket_options.bind` is set, otherwise it connects to
    /// it. If `socket_options.block_on_first_connect` is set this function waits for the first
    /// connection (up to the connect timeout) and fails if it isn't made.
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        socket_options: SocketOptions,
        endpoint: &str,
    ) -> Result<Self, MonitoredSocketError> {
        let socket = ctx
            .socket(socket_type)
            .map_err(MonitoredSocketError::CreateSocketError)?;

        // The monitor must be attached before connecting so that no events are missed
        let monitor_endpoint = format!(
            "inproc://monitor_{}",
            NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
        );
        socket
            .monitor(&monitor_endpoint, SocketEvent::ALL as i32)
            .map_err(MonitoredSocketError::MonitoringEnableError)?;
        let monitor = ctx
            .socket(zmq::PAIR)
            .map_err(MonitoredSocketError::CreateSocketError)?;
        monitor
            .connect(&monitor_endpoint)
            .map_err(|e| MonitoredSocketError::CouldNotConnect(monitor_endpoint.clone(), Some(e)))?;

        socket_options.set(&socket)?;

        let attach_result = if socket_options.bind {
            socket.bind(endpoint)
        } else {
            socket.connect(endpoint)
        };
        attach_result.map_err(|e| MonitoredSocketError::CouldNotConnect(endpoint.into(), Some(e)))?;

        let num_peers = Arc::new(AtomicUsize::new(0));

        if socket_options.block_on_first_connect {
            monitor::wait_for_connection(&monitor)
                .map_err(|e| match e {
                    Some(e) => MonitoredSocketError::EventReadError(e),
                    None => MonitoredSocketError::CouldNotConnect(endpoint.into(), None),
                })?;
            num_peers.store(1, Ordering::Relaxed);
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let monitor_jh = {
            let shutdown = shutdown.clone();
            let num_peers = num_peers.clone();
            thread::spawn(move || monitor::run(monitor, monitor_endpoint, shutdown, num_peers))
        };

        Ok(Self {
            socket,
            monitor_jh: Some(monitor_jh),
            shutdown,
            num_peers,
        })
    }

    /// Create a new monitored `SUB` socket which is subscribed to all messages published on the
    /// endpoint.
    pub fn new_subscriber(
        ctx: &Context,
        socket_options: SocketOptions,
        endpoint: &str,
    ) -> Result<Self, MonitoredSocketError> {
        let socket = Self::new(ctx, zmq::SUB, socket_options, endpoint)?;

        // The empty prefix matches every message
        socket
            .set_subscribe(b"")
            .map_err(|e| MonitoredSocketError::SocketOptionError("subscribe", e))?;

        Ok(socket)
    }

    /// Returns `true` if at least one peer is connected.
    pub fn connected(&self) -> bool {
        self.num_peers() > 0
    }

    /// Number of peers currently connected to the socket.
    pub fn num_peers(&self) -> usize {
        self.num_peers.load(Ordering::Relaxed)
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The monitor thread only notices the flag on its next event, so it's detached
        self.monitor_jh.take();
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl std::ops::DerefMut for MonitoredSocket {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}
