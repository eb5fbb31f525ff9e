//! # Closed-loop pipeline processors
//!
//! This module provides the scalar PID controller used across the drive
//! software, plus pipeline processors which close heading and turning-rate
//! loops over [`TankDriveData`].
//!
//! The controller is deliberately clock-free: the caller passes the current
//! elapsed time into every update, so the controller is deterministic and
//! can be tested without mocking time. Pipeline processors obtain that time
//! from an injected monotonic clock closure.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{Processor, TankDriveData};
use util::maths::ang_err;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains for a PID controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,
}

/// Accumulated state of a PID controller.
///
/// Kept separate from the gains so that resetting between discrete control
/// episodes is a simple matter of restoring the default state.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PidState {
    /// The integral accumulation
    integral: f64,

    /// Error from the previous update, `None` before the first update
    prev_error: Option<f64>,

    /// Time of the previous update, `None` before the first update
    prev_time_s: Option<f64>,
}

/// A PID controller.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PidController {
    gains: PidGains,

    state: PidState,
}

/// A [`Processor`] executing a generic PID loop over the pipeline data.
///
/// The error extraction and output application are delegated to a
/// [`ClosedLoop`] implementation, while this struct owns the controller
/// state and the clock.
pub struct PidProcessor<L> {
    pid: PidController,

    logic: L,

    /// Monotonic elapsed-seconds source used to time the loop
    clock: Box<dyn FnMut() -> f64>,
}

/// Closed-loop logic for a [`PidProcessor`] maintaining a heading.
pub struct HeadingPidLoop {
    /// Source of the current heading, in radians in [0, 2pi)
    heading_source: Box<dyn FnMut() -> f64>,

    /// If true the loop output is applied to the position setpoints rather
    /// than the additional feed-forwards
    output_to_position: bool,

    /// If true the loop output is added to the left side and subtracted from
    /// the right, rather than the reverse
    invert_sides: bool,
}

/// Closed-loop logic for a [`PidProcessor`] maintaining a turning rate.
pub struct TurningRatePidLoop {
    /// Source of the current yaw rate, in radians/second
    yaw_rate_source: Box<dyn FnMut() -> f64>,

    /// If true the loop output is added to the left side and subtracted from
    /// the right, rather than the reverse
    invert_sides: bool,
}

/// A [`PidProcessor`] maintaining the drivetrain's heading.
pub type HeadingPidProcessor = PidProcessor<HeadingPidLoop>;

/// A [`PidProcessor`] maintaining the drivetrain's turning rate.
pub type TurningRatePidProcessor = PidProcessor<TurningRatePidLoop>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The domain-specific hooks of a [`PidProcessor`].
pub trait ClosedLoop {
    /// The type of data the loop reads its error from.
    type Input;

    /// The type of data the loop writes its output onto.
    type Output;

    /// Extract the loop error (deviation of the controlled quantity from its
    /// target) from this tick's data.
    fn error(&mut self, input: &Self::Input) -> f64;

    /// Apply the scalar loop output back onto this tick's data, producing
    /// the processor's output.
    fn output(&mut self, input: Self::Input, loop_output: f64) -> Self::Output;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            gains: PidGains { k_p, k_i, k_d },
            state: PidState::default(),
        }
    }

    /// Create a new controller from a [`PidGains`] value.
    pub fn from_gains(gains: PidGains) -> Self {
        Self {
            gains,
            state: PidState::default(),
        }
    }

    /// Update the controller with the error at the given elapsed time and
    /// get the loop output.
    ///
    /// The first update after construction or [`reset`](Self::reset)
    /// contributes only the proportional term, as no previous timestamp
    /// exists from which to compute a time delta. Subsequent updates
    /// accumulate the integral and compute the derivative against the time
    /// passed since the previous update. An update with a non-increasing
    /// time is treated like a first update, so repeated same-timestamp
    /// updates cannot divide by zero.
    pub fn update(&mut self, error: f64, time_s: f64) -> f64 {
        let mut output = error * self.gains.k_p;

        if let Some(prev_time_s) = self.state.prev_time_s {
            let dt_s = time_s - prev_time_s;

            if dt_s > 0.0 {
                self.state.integral += error * dt_s;
                output += self.gains.k_i * self.state.integral;

                if let Some(prev_error) = self.state.prev_error {
                    output += self.gains.k_d * (error - prev_error) / dt_s;
                }
            }
        }

        self.state.prev_error = Some(error);
        self.state.prev_time_s = Some(time_s);

        output
    }

    /// Reset the controller.
    ///
    /// This clears the integral accumulator, previous error, and previous
    /// timestamp, and must be called between discrete control episodes.
    /// Calling this is functionally equivalent to creating a new controller
    /// with the same gains.
    pub fn reset(&mut self) {
        self.state = PidState::default();
    }

    /// Get the current value of the integral accumulator, or 0 if the loop
    /// has not yet run.
    pub fn integral_accum(&self) -> f64 {
        self.state.integral
    }

    /// Get the error from the last update, or 0 if the loop has not yet
    /// run.
    pub fn last_error(&self) -> f64 {
        self.state.prev_error.unwrap_or(0.0)
    }
}

impl<L> PidProcessor<L> {
    /// Create a new processor from its loop logic, gains, and a monotonic
    /// elapsed-seconds clock.
    pub fn new(logic: L, gains: PidGains, clock: Box<dyn FnMut() -> f64>) -> Self {
        Self {
            pid: PidController::from_gains(gains),
            logic,
            clock,
        }
    }

    /// Reset the loop state.
    ///
    /// Required when reusing the processor for a second, discrete control
    /// episode.
    pub fn reset(&mut self) {
        self.pid.reset();
    }

    /// Get the current value of the integral accumulator.
    pub fn integral_accum(&self) -> f64 {
        self.pid.integral_accum()
    }

    /// Get the error from the last tick.
    pub fn last_error(&self) -> f64 {
        self.pid.last_error()
    }
}

impl<L> Processor<L::Input> for PidProcessor<L>
where
    L: ClosedLoop
{
    type Output = L::Output;

    fn apply(&mut self, input: L::Input) -> L::Output {
        let error = self.logic.error(&input);
        let time_s = (self.clock)();

        let loop_output = self.pid.update(error, time_s);

        self.logic.output(input, loop_output)
    }
}

impl HeadingPidProcessor {
    /// Create a new heading processor.
    ///
    /// The heading source supplies the current heading in radians in
    /// [0, 2pi). If `output_to_position` is true the loop output perturbs
    /// the position setpoints, otherwise the additional feed-forwards. With
    /// `invert_sides` false the output is subtracted from the left side and
    /// added to the right.
    pub fn heading(
        gains: PidGains,
        heading_source: Box<dyn FnMut() -> f64>,
        output_to_position: bool,
        invert_sides: bool,
        clock: Box<dyn FnMut() -> f64>,
    ) -> Self {
        PidProcessor::new(
            HeadingPidLoop {
                heading_source,
                output_to_position,
                invert_sides,
            },
            gains,
            clock,
        )
    }
}

impl TurningRatePidProcessor {
    /// Create a new turning rate processor.
    ///
    /// The yaw rate source supplies the current yaw rate in radians/second.
    /// With `invert_sides` false the output is subtracted from the left
    /// velocity and added to the right.
    pub fn turning_rate(
        gains: PidGains,
        yaw_rate_source: Box<dyn FnMut() -> f64>,
        invert_sides: bool,
        clock: Box<dyn FnMut() -> f64>,
    ) -> Self {
        PidProcessor::new(
            TurningRatePidLoop {
                yaw_rate_source,
                invert_sides,
            },
            gains,
            clock,
        )
    }
}

impl ClosedLoop for HeadingPidLoop {
    type Input = TankDriveData;
    type Output = TankDriveData;

    fn error(&mut self, input: &TankDriveData) -> f64 {
        match input.heading {
            // Wraparound-safe shortest signed error between the current
            // heading and the target
            Some(target) => ang_err((self.heading_source)(), target),
            None => 0.0,
        }
    }

    fn output(&mut self, input: TankDriveData, loop_output: f64) -> TankDriveData {
        // multiplying the output by -1 effectively flips the sides
        let loop_output = if self.invert_sides {
            -loop_output
        } else {
            loop_output
        };

        if self.output_to_position {
            input.plus_positions(-loop_output, loop_output)
        } else {
            input.plus_additional_feed_forwards(-loop_output, loop_output)
        }
    }
}

impl ClosedLoop for TurningRatePidLoop {
    type Input = TankDriveData;
    type Output = TankDriveData;

    fn error(&mut self, input: &TankDriveData) -> f64 {
        match input.turning_rate {
            Some(target) => target - (self.yaw_rate_source)(),
            None => 0.0,
        }
    }

    fn output(&mut self, input: TankDriveData, loop_output: f64) -> TankDriveData {
        // multiplying the output by -1 effectively flips the sides
        let loop_output = if self.invert_sides {
            -loop_output
        } else {
            loop_output
        };

        input.plus_velocities(-loop_output, loop_output)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::pipeline::DriveData;
    use std::cell::Cell;
    use std::rc::Rc;

    /// A clock which advances by a fixed step on every read.
    fn stepping_clock(step_s: f64) -> Box<dyn FnMut() -> f64> {
        let mut time_s = 0.0;
        Box::new(move || {
            let now_s = time_s;
            time_s += step_s;
            now_s
        })
    }

    #[test]
    fn test_first_update_is_proportional_only() {
        let mut pid = PidController::new(2.0, 10.0, 10.0);
        assert_eq!(pid.update(3.0, 0.0), 6.0);
    }

    #[test]
    fn test_integral_accumulates() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);

        pid.update(2.0, 0.0);
        // After 0.5 s at error 2 the integral is 1.0
        let output = pid.update(2.0, 0.5);

        assert!((output - 1.0).abs() < 1e-12);
        assert!((pid.integral_accum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_derivative_tracks_error_slope() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);

        pid.update(0.0, 0.0);
        // Error rises by 1 over 0.5 s, so the derivative term is 2
        let output = pid.update(1.0, 0.5);

        assert!((output - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_timestamp_update_does_not_blow_up() {
        let mut pid = PidController::new(1.0, 1.0, 1.0);

        pid.update(1.0, 0.0);
        let output = pid.update(1.0, 0.0);

        assert!(output.is_finite());
        assert_eq!(output, 1.0);
    }

    #[test]
    fn test_reset_idempotence() {
        let mut pid = PidController::new(1.5, 0.5, 0.25);
        let mut fresh = PidController::new(1.5, 0.5, 0.25);

        pid.update(3.0, 0.0);
        pid.update(2.0, 0.1);
        pid.reset();
        pid.reset();

        assert_eq!(pid.update(1.0, 0.2), fresh.update(1.0, 0.2));
    }

    #[test]
    fn test_heading_processor_wraparound() {
        const TAU: f64 = std::f64::consts::TAU;

        let heading = Rc::new(Cell::new(0.1));
        let heading_clone = heading.clone();

        let mut processor = HeadingPidProcessor::heading(
            PidGains { k_p: 1.0, k_i: 0.0, k_d: 0.0 },
            Box::new(move || heading_clone.get()),
            false,
            false,
            stepping_clock(0.02),
        );

        let input = TankDriveData::default().with_heading(TAU - 0.1);
        let output = processor.apply(input);

        // The shortest path from the target to the heading is +0.2 rad, so
        // the left side is pushed back and the right side forward
        let left = output.left.additional_feed_forward.unwrap();
        let right = output.right.additional_feed_forward.unwrap();
        assert!((left + 0.2).abs() < 1e-12);
        assert!((right - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_heading_processor_no_target_is_noop_error() {
        let mut processor = HeadingPidProcessor::heading(
            PidGains { k_p: 2.0, k_i: 0.0, k_d: 0.0 },
            Box::new(|| 1.0),
            true,
            false,
            stepping_clock(0.02),
        );

        let output = processor.apply(TankDriveData::default());

        // No target means zero error, and zero is still applied to the
        // positions
        assert_eq!(output.left.position, Some(0.0));
        assert_eq!(output.right.position, Some(0.0));
    }

    #[test]
    fn test_turning_rate_processor_perturbs_velocities() {
        let mut processor = TurningRatePidProcessor::turning_rate(
            PidGains { k_p: 1.0, k_i: 0.0, k_d: 0.0 },
            Box::new(|| 0.5),
            false,
            stepping_clock(0.02),
        );

        let input = TankDriveData::new(
            DriveData::with_velocity_only(2.0),
            DriveData::with_velocity_only(2.0),
            None,
            Some(1.5),
        );
        let output = processor.apply(input);

        // Error is 1.5 - 0.5 = 1.0
        assert_eq!(output.left.velocity, Some(1.0));
        assert_eq!(output.right.velocity, Some(3.0));
    }

    #[test]
    fn test_invert_sides_flips_output() {
        let mut processor = TurningRatePidProcessor::turning_rate(
            PidGains { k_p: 1.0, k_i: 0.0, k_d: 0.0 },
            Box::new(|| 0.0),
            true,
            stepping_clock(0.02),
        );

        let input = TankDriveData::default().with_turning_rate(1.0);
        let output = processor.apply(input);

        assert_eq!(output.left.velocity, Some(1.0));
        assert_eq!(output.right.velocity, Some(-1.0));
    }
}
