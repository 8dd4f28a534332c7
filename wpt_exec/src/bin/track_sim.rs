//! # Track Simulator
//!
//! This binary drives the waypoint updater without requiring the rest of the vehicle software.
//! It publishes a circular track of base waypoints, a vehicle pose moving around that track and a
//! stop line which periodically appears ahead of the vehicle and is then cleared.
//!
//! The simulated vehicle drives at the speed of the first final waypoint it receives back, so it
//! will slow down and stop for the stop line.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    f64::consts::TAU,
    thread,
    time::{Duration, Instant},
};

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use structopt::StructOpt;

use comms_if::{
    net::{zmq, MonitoredSocket, SocketOptions},
    wpt::{Lane, PoseMsg, WaypointMsg, WptInput},
};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "track_sim", about = "Circular track simulator for the waypoint updater")]
struct Opts {
    /// Endpoint to publish the inputs on
    #[structopt(long, default_value = "tcp://*:5100")]
    input_endpoint: String,

    /// Endpoint the final waypoints are published on
    #[structopt(long, default_value = "tcp://localhost:5101")]
    final_wpts_endpoint: String,

    /// Radius of the track in meters
    #[structopt(long, default_value = "50.0")]
    radius_m: f64,

    /// Number of waypoints around the track
    #[structopt(long, default_value = "300")]
    num_wpts: usize,

    /// Cruise speed of the base waypoints in meters/second
    #[structopt(long, default_value = "10.0")]
    speed_ms: f64,

    /// Number of waypoints ahead of the vehicle the stop line is placed
    #[structopt(long, default_value = "40")]
    stop_ahead_wpts: usize,

    /// Time in seconds between the stop line appearing and being cleared
    #[structopt(long, default_value = "15.0")]
    stop_period_s: f64,

    /// Simulation frequency in Hz
    #[structopt(long, default_value = "20.0")]
    frequency_hz: f64,

    /// Time in seconds to run for, zero runs until interrupted
    #[structopt(long, default_value = "0.0")]
    duration_s: f64,
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Base waypoints are republished this often so that late subscribers receive them.
const BASE_WPTS_PERIOD_S: f64 = 5.0;

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("track_sim", "sessions").wrap_err("Failed to create the session")?;
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Track Simulator\n");
    info!("{:#?}\n", opts);

    // ---- NETWORK ----

    let ctx = zmq::Context::new();

    let pub_socket = MonitoredSocket::new(
        &ctx,
        zmq::PUB,
        SocketOptions::publisher(),
        &opts.input_endpoint,
    )
    .wrap_err("Could not create the input publisher")?;

    let sub_socket = MonitoredSocket::new_subscriber(
        &ctx,
        SocketOptions::subscriber(0),
        &opts.final_wpts_endpoint,
    )
    .wrap_err("Could not subscribe to the final waypoints")?;

    // ---- TRACK ----

    let track = circular_track(opts.radius_m, opts.num_wpts, opts.speed_ms);

    // ---- MAIN LOOP ----

    let period = Duration::from_secs_f64(1.0 / opts.frequency_hz);
    let start = Instant::now();

    let mut theta_rad = 0.0;
    let mut vehicle_speed_ms = opts.speed_ms;
    let mut last_base_wpts_s = -BASE_WPTS_PERIOD_S;
    let mut stop_line_idx: Option<usize> = None;
    let mut last_stop_toggle_s = 0.0;

    loop {
        let cycle_start = Instant::now();
        let time_s = start.elapsed().as_secs_f64();

        // Republish the track
        if time_s - last_base_wpts_s >= BASE_WPTS_PERIOD_S {
            publish(&pub_socket, &WptInput::BaseWaypoints(track.clone()));
            last_base_wpts_s = time_s;
        }

        // Toggle the stop line
        if time_s - last_stop_toggle_s >= opts.stop_period_s {
            stop_line_idx = match stop_line_idx {
                Some(_) => None,
                None => {
                    let current = (theta_rad / TAU * opts.num_wpts as f64) as usize;
                    Some((current + opts.stop_ahead_wpts) % opts.num_wpts)
                }
            };
            info!("Stop line: {:?}", stop_line_idx);
            last_stop_toggle_s = time_s;
        }
        publish(&pub_socket, &WptInput::traffic_wpt(stop_line_idx));

        // Follow the first final waypoint's speed
        while let Ok(Ok(msg)) = sub_socket.recv_string(0) {
            match serde_json::from_str::<Lane>(&msg) {
                Ok(lane) => {
                    if let Some(w) = lane.waypoints.first() {
                        vehicle_speed_ms = w.speed_ms;
                    }
                    debug!(
                        "Final waypoints: {} waypoints, speeds {:?}",
                        lane.waypoints.len(),
                        lane.waypoints.iter().map(|w| w.speed_ms).collect::<Vec<_>>()
                    );
                }
                Err(e) => warn!("Could not deserialise final waypoints: {}", e),
            }
        }

        // Move the vehicle around the track
        theta_rad = (theta_rad + vehicle_speed_ms * period.as_secs_f64() / opts.radius_m) % TAU;
        publish(&pub_socket, &WptInput::Pose(pose_on_track(opts.radius_m, theta_rad)));

        debug!(
            "Vehicle at {:.01} m along the track, {:.02} m/s",
            theta_rad * opts.radius_m,
            vehicle_speed_ms
        );

        if let Some(d) = period.checked_sub(cycle_start.elapsed()) {
            thread::sleep(d);
        }

        if opts.duration_s > 0.0 && time_s >= opts.duration_s {
            info!("Simulation duration reached, stopping");
            break;
        }
    }

    session.exit();

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// A circular track of waypoints, anticlockwise around the origin.
fn circular_track(radius_m: f64, num_wpts: usize, speed_ms: f64) -> Lane {
    let waypoints = (0..num_wpts)
        .map(|i| WaypointMsg {
            pose: pose_on_track(radius_m, TAU * i as f64 / num_wpts as f64),
            speed_ms,
        })
        .collect();

    Lane::new("world", waypoints)
}

/// The pose at angle `theta_rad` around the track, heading anticlockwise.
fn pose_on_track(radius_m: f64, theta_rad: f64) -> PoseMsg {
    let half_yaw = (theta_rad + TAU / 4.0) / 2.0;

    PoseMsg {
        position_m: [radius_m * theta_rad.cos(), radius_m * theta_rad.sin(), 0.0],
        orientation_q: [0.0, 0.0, half_yaw.sin(), half_yaw.cos()],
    }
}

/// Serialise and publish an input message, warning on failure.
fn publish(socket: &MonitoredSocket, input: &WptInput) {
    let msg = match serde_json::to_string(input) {
        Ok(m) => m,
        Err(e) => {
            warn!("Could not serialise input: {}", e);
            return;
        }
    };

    if let Err(e) = socket.send(msg.as_str(), 0) {
        warn!("Could not publish input: {}", e);
    }
}
