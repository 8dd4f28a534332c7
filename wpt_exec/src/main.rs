//! Main waypoint updater executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Snapshot the latest inputs from the input client
//!         - Waypoint updater processing
//!         - Publish the final waypoints
//!         - Write archives
//!
//! Inputs are received asynchronously by the input client's background thread, so the main loop
//! never blocks waiting on the network.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, error, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::NetParams;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};
use wpt_lib::{
    data_store::DataStore,
    final_wpts_server::FinalWptsServer,
    input_client::InputClient,
    params::WptExecParams,
    wpt_updater::WptUpdaterError,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("wpt_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Waypoint Updater Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    let exec_params: WptExecParams =
        util::params::load("exec.toml").wrap_err("Could not load exec params")?;

    let cycle_period_s = exec_params.cycle_period_s().ok_or_else(|| {
        eyre!(
            "Invalid cycle frequency ({} Hz), must be finite and positive",
            exec_params.cycle_frequency_hz
        )
    })?;
    let cycle_period = Duration::from_secs_f64(cycle_period_s);

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.wpt_updater
        .init("wpt_updater.toml", &session)
        .wrap_err("Failed to initialise WptUpdater")?;
    info!("WptUpdater init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let input_client = {
        let c = InputClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise InputClient")?;
        info!("InputClient initialised");
        c
    };

    let mut final_wpts_server = {
        let s = FinalWptsServer::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise FinalWptsServer")?;
        info!("FinalWptsServer initialised");
        s
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!(
        "Begining main loop at {:.01} Hz\n",
        exec_params.cycle_frequency_hz
    );

    let mut subscriber_connected = false;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- DATA INPUT ----

        if !input_client.is_alive() {
            error!("InputClient has stopped receiving, exiting");
            break;
        }

        ds.cycle_start(input_client.inputs());

        // ---- WAYPOINT UPDATER PROCESSING ----

        match ds.wpt_updater.proc(&ds.wpt_updater_input) {
            Ok((o, r)) => {
                if ds.not_ready.take().is_some() {
                    info!("WptUpdater ready");
                }

                debug!(
                    "Ahead of base waypoint {} (gen {}), stop at {:?}, speeds {:.02}-{:.02} m/s",
                    r.ahead_idx, r.generation, r.stop_local_idx, r.min_speed_ms, r.max_speed_ms
                );

                ds.wpt_updater_output = Some(o);
                ds.wpt_updater_status_rpt = r;
            }
            Err(WptUpdaterError::NotReady(reason)) => {
                if ds.not_ready != Some(reason) {
                    info!("WptUpdater not ready: {}", reason);
                }
                debug!("Skipping cycle {}, {}", ds.num_cycles, reason);
                ds.not_ready = Some(reason);
            }
            Err(e) => warn!("Error during WptUpdater processing: {}", e),
        }

        // ---- OUTPUT ----

        if final_wpts_server.is_connected() != subscriber_connected {
            subscriber_connected = !subscriber_connected;
            if subscriber_connected {
                info!("Final waypoints subscriber connected");
            } else {
                warn!("No final waypoints subscribers connected");
            }
        }

        if let Some(ref final_wpts) = ds.wpt_updater_output {
            if let Err(e) = final_wpts_server.send(final_wpts) {
                warn!("FinalWptsServer error: {}", e);
            }

            // ---- WRITE ARCHIVES ----

            if let Err(e) = ds.wpt_updater.write() {
                warn!("Could not write the WptUpdater archive: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    drop(input_client);
    session.exit();

    info!("End of execution");

    Ok(())
}
