//! Socket monitor thread

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use log::{debug, warn};
use zmq::{Socket, SocketEvent};

/// Block until the monitored socket makes its first connection.
///
/// Returns `Err(None)` if the connection failed and `Err(Some(_))` if the monitor couldn't be
/// read.
pub(super) fn wait_for_connection(monitor: &Socket) -> Result<(), Option<zmq::Error>> {
    loop {
        match read_event(monitor).map_err(Some)? {
            SocketEvent::CONNECTED => return Ok(()),
            SocketEvent::CONNECT_DELAYED => continue,
            _ => return Err(None),
        }
    }
}

/// Body of the monitor thread, counts peers until `shutdown` is set or the monitor stops.
pub(super) fn run(
    monitor: Socket,
    monitor_endpoint: String,
    shutdown: Arc<AtomicBool>,
    num_peers: Arc<AtomicUsize>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let event = match read_event(&monitor) {
            Ok(e) => e,
            Err(e) => {
                warn!("Error reading event from monitor {}: {}", monitor_endpoint, e);
                break;
            }
        };

        match event {
            SocketEvent::CONNECTED | SocketEvent::ACCEPTED => {
                let n = num_peers.fetch_add(1, Ordering::Relaxed) + 1;
                debug!("{}: peer connected ({} connected)", monitor_endpoint, n);
            }
            SocketEvent::DISCONNECTED => {
                // Saturate at zero, a blocking connect may already have been counted
                let _ = num_peers.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                    Some(n.saturating_sub(1))
                });
                debug!("{}: peer disconnected", monitor_endpoint);
            }
            SocketEvent::MONITOR_STOPPED => break,
            _ => (),
        }
    }
}

/// Read an event from a monitor socket.
///
/// Each event is a two frame message, the first frame holding the event ID and value and the
/// second the affected endpoint address.
fn read_event(monitor: &Socket) -> Result<SocketEvent, zmq::Error> {
    let msg = monitor.recv_msg(0)?;
    if msg.len() < 2 || !monitor.get_rcvmore()? {
        return Err(zmq::Error::EPROTO);
    }
    let event = u16::from_ne_bytes([msg[0], msg[1]]);

    // Address frame
    monitor.recv_msg(0)?;

    Ok(SocketEvent::from_raw(event))
}
