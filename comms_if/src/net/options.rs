//! Socket options

use zmq::Socket;

use super::MonitoredSocketError;

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| MonitoredSocketError::SocketOptionError(stringify!($opt), e))?;
        )+
    };
}

/// Options for a [`MonitoredSocket`](super::MonitoredSocket).
///
/// Timeouts and intervals are in milliseconds, and correspond to the options of the same name in
/// the [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
#[derive(Debug, Clone, Copy)]
pub struct SocketOptions {
    /// Bind to the endpoint rather than connecting to it. Publishers bind.
    pub bind: bool,

    /// Wait for the first connection when creating the socket.
    pub block_on_first_connect: bool,

    /// `ZMQ_LINGER`
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`
    pub reconnect_ivl: i32,

    /// `ZMQ_RECONNECT_IVL_MAX`
    pub reconnect_ivl_max: i32,

    /// `ZMQ_CONNECT_TIMEOUT`
    pub connect_timeout: i32,

    /// `ZMQ_RCVTIMEO`, receives return `EAGAIN` after this long. -1 blocks forever.
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`
    pub send_timeout: i32,

    /// `ZMQ_HEARTBEAT_IVL`
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`
    pub heartbeat_timeout: i32,

    /// `ZMQ_HEARTBEAT_TTL`
    pub heartbeat_ttl: i32,
}

impl SocketOptions {
    /// Options for a publisher which binds and never waits for subscribers.
    pub fn publisher() -> Self {
        Self {
            bind: true,
            block_on_first_connect: false,
            ..Self::heartbeat()
        }
    }

    /// Options for a subscriber polled from a loop, receives time out after `recv_timeout` ms.
    pub fn subscriber(recv_timeout: i32) -> Self {
        Self {
            block_on_first_connect: false,
            recv_timeout,
            ..Self::heartbeat()
        }
    }

    /// Short timeouts with heartbeats enabled, so a lost peer is noticed within a second.
    fn heartbeat() -> Self {
        Self {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        }
    }

    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        set_sockopts!(
            socket,
            (set_connect_timeout, self.connect_timeout),
            (set_heartbeat_ivl, self.heartbeat_ivl),
            (set_heartbeat_timeout, self.heartbeat_timeout),
            (set_heartbeat_ttl, self.heartbeat_ttl),
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_reconnect_ivl_max, self.reconnect_ivl_max),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    /// The zmq defaults, connecting and blocking until connected.
    fn default() -> Self {
        Self {
            bind: false,
            block_on_first_connect: true,
            connect_timeout: 0,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
            heartbeat_ttl: 0,
            linger: 30_000,
            reconnect_ivl: 100,
            reconnect_ivl_max: 0,
            recv_timeout: -1,
            send_timeout: 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_presets() {
        let p = SocketOptions::publisher();
        assert!(p.bind && !p.block_on_first_connect);
        assert_eq!(p.heartbeat_ivl, 500);

        let s = SocketOptions::subscriber(0);
        assert!(!s.bind && !s.block_on_first_connect);
        assert_eq!(s.recv_timeout, 0);
        assert_eq!(s.linger, 1);
    }

    #[test]
    fn test_set_on_socket() {
        let ctx = zmq::Context::new();
        let socket = ctx.socket(zmq::SUB).unwrap();

        SocketOptions::subscriber(25).set(&socket).unwrap();

        assert_eq!(socket.get_rcvtimeo().unwrap(), 25);
        assert_eq!(socket.get_linger().unwrap(), 1);
    }
}
