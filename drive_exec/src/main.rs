//! Main drive executable entry point.
//!
//! # Architecture
//!
//! The executable demonstrates the two ways of running a motion profile:
//!
//!     - Initialise the session, logger, and parameters
//!     - Load the pre-generated profiles from the profiles directory
//!     - Follower run: tick a ProfileFollower against the simulated
//!       drivetrain at a fixed rate until the profile is finished
//!     - Pipeline run: assemble a profile input, feed-forward processor,
//!       heading loop, and setpoint output into a single executable and
//!       tick that instead
//!
//! Both runs close the loop through the simulated drivetrain in `sim`,
//! which stands in for the real vehicle's motor controllers and gyro.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use drive_lib::{
    follower::{Params as FollowerParams, ProfileFollower},
    pipeline::{
        Executable, FeedForwardProcessor, HeadingPidProcessor, Input, PidGains, ProfileInput,
        SetpointOutput,
    },
    profile::{ProfileContainer, ProfilePair},
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Track width of the simulated drivetrain.
///
/// Units: profile units
const SIM_TRACK_WIDTH: f64 = 2.0;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("drive_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Deimos Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let follower_params: FollowerParams = util::params::load("follow.toml")
        .wrap_err("Could not load follower params")?;

    info!("Follower parameters loaded");

    // ---- LOAD PROFILES ----

    let mut profile_dir = host::get_deimos_sw_root()
        .wrap_err("The software root environment variable is not set")?;
    profile_dir.push("profiles");

    let container = ProfileContainer::from_dir(&profile_dir)
        .wrap_err("Could not load the profiles")?;

    info!("{} profile(s) loaded", container.len());

    // The profile to execute can be given as the first argument
    let profile_name = env::args().nth(1).unwrap_or_else(|| String::from("demo"));

    let pair = container
        .get(&profile_name)
        .ok_or_else(|| eyre!("No profile named {:?} found", profile_name))?
        .clone();

    // ---- EXECUTE ----

    follower_run(&pair, &follower_params);

    pipeline_run(&pair, &follower_params);

    info!("Execution complete");

    Ok(())
}

/// Run the profile through a [`ProfileFollower`] ticked directly.
fn follower_run(pair: &ProfilePair, params: &FollowerParams) {
    info!("Starting follower run");

    let mut follower = ProfileFollower::new(pair.left.clone(), pair.right.clone(), params);
    let mut drivetrain = sim::SimDrivetrain::new(SIM_TRACK_WIDTH);

    let mut time_s = 0.0;

    while !follower.is_finished(time_s) {
        let cycle_start = Instant::now();

        let signal = follower.get(drivetrain.heading(), time_s);

        drivetrain.set_left(signal.left_setpoint, signal.left_bump);
        drivetrain.set_right(signal.right_setpoint, signal.right_bump);
        drivetrain.step(CYCLE_PERIOD_S);

        debug!("t = {:6.2} s: {}", time_s, signal);

        time_s += CYCLE_PERIOD_S;

        // Sleep out the remainder of the cycle
        if let Some(remaining) =
            Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_start.elapsed())
        {
            thread::sleep(remaining);
        }
    }

    info!(
        "Follower run complete: left position {:.3}, right position {:.3}, heading {:.4} rad",
        drivetrain.left_position(),
        drivetrain.right_position(),
        drivetrain.heading()
    );
}

/// Run the profile through a composed drive pipeline ticked as a single
/// executable.
fn pipeline_run(pair: &ProfilePair, params: &FollowerParams) {
    info!("Starting pipeline run");

    let drivetrain = Rc::new(RefCell::new(sim::SimDrivetrain::new(SIM_TRACK_WIDTH)));
    let time_s = Rc::new(Cell::new(0.0));

    let duration_s = pair.left.duration().max(pair.right.duration());

    // Profile lookup, timed by the shared tick clock
    let input = ProfileInput::new(pair.left.clone(), pair.right.clone(), {
        let time_s = time_s.clone();
        Box::new(move || time_s.get())
    });

    // Feed-forward, using the left coefficients for both sides
    let feed_forward = FeedForwardProcessor::new(
        params.l_vel_coeff,
        params.l_vel_intercept,
        params.l_accel_coeff,
    );

    // Heading loop closing on the simulated gyro, output onto the position
    // setpoints
    let heading_pid = HeadingPidProcessor::heading(
        PidGains {
            k_p: params.heading_k_p,
            k_i: params.heading_k_i,
            k_d: 0.0,
        },
        {
            let drivetrain = drivetrain.clone();
            Box::new(move || drivetrain.borrow().heading())
        },
        true,
        false,
        {
            let time_s = time_s.clone();
            Box::new(move || time_s.get())
        },
    );

    // Setpoint dispatch into the simulated motor controllers
    let output = SetpointOutput::new(
        {
            let drivetrain = drivetrain.clone();
            move |setpoint: f64, bump: f64| drivetrain.borrow_mut().set_left(setpoint, bump)
        },
        {
            let drivetrain = drivetrain.clone();
            move |setpoint: f64, bump: f64| drivetrain.borrow_mut().set_right(setpoint, bump)
        },
    );

    // The whole tick as one executable
    let mut tick = input.then(feed_forward).then(heading_pid).feed(output);

    while time_s.get() <= duration_s {
        let cycle_start = Instant::now();

        tick.execute();
        drivetrain.borrow_mut().step(CYCLE_PERIOD_S);

        debug!(
            "t = {:6.2} s: left position {:.3}, right position {:.3}",
            time_s.get(),
            drivetrain.borrow().left_position(),
            drivetrain.borrow().right_position()
        );

        time_s.set(time_s.get() + CYCLE_PERIOD_S);

        // Sleep out the remainder of the cycle
        if let Some(remaining) =
            Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_start.elapsed())
        {
            thread::sleep(remaining);
        }
    }

    info!(
        "Pipeline run complete: left position {:.3}, right position {:.3}, heading {:.4} rad",
        drivetrain.borrow().left_position(),
        drivetrain.borrow().right_position(),
        drivetrain.borrow().heading()
    );
}
