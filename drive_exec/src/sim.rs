//! Simulated drivetrain for closed-loop demonstration runs
//!
//! This is a deliberately crude stand-in for the real vehicle: each side's
//! position tracks its setpoint as a first-order lag with the throttle bump
//! contributing extra travel, and heading follows from the difference in
//! side travel over the track width.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use util::maths::rem_euclid;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time constant of each side's position tracking.
///
/// Units: seconds
const TRACKING_TIME_CONST_S: f64 = 0.1;

/// Speed of a side at full throttle bump.
///
/// Units: profile units/second
const FULL_THROTTLE_SPEED: f64 = 60.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A simulated two-sided drivetrain.
pub struct SimDrivetrain {
    /// Distance between the left and right wheels.
    ///
    /// Units: profile units
    track_width: f64,

    left_position: f64,
    right_position: f64,

    /// Latest demand for each side: (position setpoint, throttle bump)
    left_demand: (f64, f64),
    right_demand: (f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDrivetrain {
    /// Create a new stationary drivetrain with the given track width.
    pub fn new(track_width: f64) -> Self {
        Self {
            track_width,
            left_position: 0.0,
            right_position: 0.0,
            left_demand: (0.0, 0.0),
            right_demand: (0.0, 0.0),
        }
    }

    /// Set the left side's demand.
    pub fn set_left(&mut self, position_setpoint: f64, feed_forward_bump: f64) {
        self.left_demand = (position_setpoint, feed_forward_bump);
    }

    /// Set the right side's demand.
    pub fn set_right(&mut self, position_setpoint: f64, feed_forward_bump: f64) {
        self.right_demand = (position_setpoint, feed_forward_bump);
    }

    /// Advance the simulation by one time step using the latest demands.
    pub fn step(&mut self, dt_s: f64) {
        let alpha = (dt_s / TRACKING_TIME_CONST_S).min(1.0);

        self.left_position += (self.left_demand.0 - self.left_position) * alpha
            + self.left_demand.1 * FULL_THROTTLE_SPEED * dt_s;
        self.right_position += (self.right_demand.0 - self.right_position) * alpha
            + self.right_demand.1 * FULL_THROTTLE_SPEED * dt_s;
    }

    /// Get the vehicle's heading in radians in [0, 2pi), increasing
    /// clockwise (the left side travelling further than the right turns the
    /// vehicle clockwise).
    pub fn heading(&self) -> f64 {
        rem_euclid(
            (self.left_position - self.right_position) / self.track_width,
            std::f64::consts::TAU,
        )
    }

    /// Get the left side's position, in profile units.
    pub fn left_position(&self) -> f64 {
        self.left_position
    }

    /// Get the right side's position, in profile units.
    pub fn right_position(&self) -> f64 {
        self.right_position
    }
}
