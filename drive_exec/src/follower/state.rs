//! Profile follower state and per-tick processing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

// Internal
use super::Params;
use crate::profile::{MotionProfile, Point};
use util::maths::ang_err;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Executes a pair of motion profiles, producing per-tick drive signals.
///
/// See the [module docs](super) for the algorithm. The follower performs no
/// validation of its profiles: a profile with no points, or whose first
/// point has a zero time step, produces non-finite signals. Callers must
/// validate profiles before constructing a follower.
#[derive(Debug, Clone)]
pub struct ProfileFollower {
    left: Arc<MotionProfile>,
    right: Arc<MotionProfile>,

    params: Params,

    /// Integral accumulator for the heading PI loop
    ///
    /// Units: radian-seconds
    gyro_i_accum: f64,

    /// Total time to execute the profile pair
    ///
    /// Units: seconds
    prof_time_s: f64,

    /// Time passed to the previous call to `get`, `None` before the first
    /// call
    last_time_s: Option<f64>,
}

/// A signal to be sent to the drivetrain, consisting of left and right
/// position setpoints and feed-forward bumps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileDriveSignal {
    /// The left-side position setpoint, in profile units.
    pub left_setpoint: f64,

    /// The left-side feed-forward throttle bump, in fractions of motor
    /// throttle (i.e. 0.5 == 50% of max motor throttle).
    pub left_bump: f64,

    /// The right-side position setpoint, in profile units.
    pub right_setpoint: f64,

    /// The right-side feed-forward throttle bump, in fractions of motor
    /// throttle.
    pub right_bump: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileFollower {
    /// Create a new `ProfileFollower` over the given profile pair.
    ///
    /// The profiles are shared read-only; pass the same `Arc` twice for a
    /// symmetric (straight-line) pair.
    pub fn new(left: Arc<MotionProfile>, right: Arc<MotionProfile>, params: &Params) -> Self {
        // The pair takes as long as its slower side
        let prof_time_s = left.duration().max(right.duration());

        Self {
            left,
            right,
            params: *params,
            gyro_i_accum: 0.0,
            prof_time_s,
            last_time_s: None,
        }
    }

    /// Get the drive signal for a given time (usually the current time).
    ///
    /// `heading` is the current gyro heading in radians from 0 to 2pi, and
    /// `time_s` is the time in seconds since profile execution began, used
    /// to find the executing profile point.
    pub fn get(&mut self, heading: f64, time_s: f64) -> ProfileDriveSignal {
        let left_point = *self.left.point_at(time_s);
        let right_point = *self.right.point_at(time_s);

        // Shortest signed error to the profile's heading target, safe
        // against wrapping at 0/2pi
        let heading_error = ang_err(heading, left_point.heading);

        if let Some(last_time_s) = self.last_time_s {
            self.gyro_i_accum += heading_error * (time_s - last_time_s);
        }
        self.last_time_s = Some(time_s);

        let gyro_p_out = heading_error * self.params.heading_k_p;
        let gyro_i_out = self.gyro_i_accum * self.params.heading_k_i;

        let left_vel_f_out = self.params.l_vel_coeff * left_point.velocity;
        let right_vel_f_out = self.params.r_vel_coeff * right_point.velocity;

        let left_vel_intercept_out = if left_point.velocity == 0.0 {
            0.0
        } else {
            self.params.l_vel_intercept.copysign(left_point.velocity)
        };
        let right_vel_intercept_out = if right_point.velocity == 0.0 {
            0.0
        } else {
            self.params.r_vel_intercept.copysign(right_point.velocity)
        };

        let left_accel_f_out = self.params.l_accel_coeff * left_point.acceleration;
        let right_accel_f_out = self.params.r_accel_coeff * right_point.acceleration;

        // A positive heading error means the vehicle points right of the
        // target, so left travel is shortened and right travel lengthened
        ProfileDriveSignal {
            left_setpoint: left_point.position - gyro_p_out - gyro_i_out,
            left_bump: left_vel_f_out + left_vel_intercept_out + left_accel_f_out,
            right_setpoint: right_point.position + gyro_p_out + gyro_i_out,
            right_bump: right_vel_f_out + right_vel_intercept_out + right_accel_f_out,
        }
    }

    /// Reset the follower so that it can be used for another run.
    ///
    /// This clears the heading integral accumulator and the last-call time.
    pub fn reset(&mut self) {
        self.gyro_i_accum = 0.0;
        self.last_time_s = None;
    }

    /// Get the current integral accumulator for the heading PI loop.
    pub fn gyro_i_accum(&self) -> f64 {
        self.gyro_i_accum
    }

    /// Get the heading error that would be fed into the PI loop for the
    /// given heading and time.
    pub fn gyro_error(&self, heading: f64, time_s: f64) -> f64 {
        ang_err(heading, self.left.point_at(time_s).heading)
    }

    /// Get the point executing on the left side at the given time.
    pub fn current_point_left(&self, time_s: f64) -> Point {
        *self.left.point_at(time_s)
    }

    /// Get the point executing on the right side at the given time.
    pub fn current_point_right(&self, time_s: f64) -> Point {
        *self.right.point_at(time_s)
    }

    /// Get the total time to execute the profile pair, in seconds.
    pub fn profile_time(&self) -> f64 {
        self.prof_time_s
    }

    /// Get whether the profile pair is finished, i.e. the given time is
    /// beyond the profile duration.
    ///
    /// The follower never stops itself; the caller is responsible for
    /// ceasing to call [`get`](Self::get) once this returns true.
    pub fn is_finished(&self, time_s: f64) -> bool {
        time_s > self.prof_time_s
    }
}

impl fmt::Display for ProfileDriveSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "left: {:.4} (bump {:.4}), right: {:.4} (bump {:.4})",
            self.left_setpoint, self.left_bump, self.right_setpoint, self.right_bump
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TAU: f64 = std::f64::consts::TAU;

    /// The three point profile used in most tests: positions 0, 1, 2 at
    /// 0.02 s spacing, cruising at 50 units/s.
    fn short_profile() -> Arc<MotionProfile> {
        Arc::new(MotionProfile::new(vec![
            Point {
                dt: 0.02,
                position: 0.0,
                velocity: 0.0,
                ..Default::default()
            },
            Point {
                dt: 0.02,
                position: 1.0,
                velocity: 50.0,
                ..Default::default()
            },
            Point {
                dt: 0.02,
                position: 2.0,
                velocity: 50.0,
                ..Default::default()
            },
        ]))
    }

    fn short_profile_params() -> Params {
        Params::symmetric(0.01, 0.02, 0.0, 1.0, 0.0)
    }

    #[test]
    fn test_cruise_point_output() {
        let profile = short_profile();
        let mut follower =
            ProfileFollower::new(profile.clone(), profile, &short_profile_params());

        let signal = follower.get(0.0, 0.02);

        assert_eq!(signal.left_setpoint, 1.0);
        assert_eq!(signal.right_setpoint, 1.0);
        assert!((signal.left_bump - 0.52).abs() < 1e-12);
        assert!((signal.right_bump - 0.52).abs() < 1e-12);
    }

    #[test]
    fn test_no_intercept_at_standstill() {
        let profile = short_profile();
        let mut follower =
            ProfileFollower::new(profile.clone(), profile, &short_profile_params());

        // The first point commands zero velocity, so no static friction
        // bump is applied
        let signal = follower.get(0.0, 0.0);
        assert_eq!(signal.left_bump, 0.0);
    }

    #[test]
    fn test_symmetry_with_heading_loop_disabled() {
        let profile = short_profile();
        let params = Params::symmetric(0.01, 0.02, 0.001, 0.0, 0.0);
        let mut follower = ProfileFollower::new(profile.clone(), profile, &params);

        for &(heading, time_s) in &[(0.0, 0.0), (1.0, 0.01), (3.0, 0.03), (6.0, 0.05)] {
            let signal = follower.get(heading, time_s);
            assert_eq!(signal.left_setpoint, signal.right_setpoint);
            assert_eq!(signal.left_bump, signal.right_bump);
        }
    }

    #[test]
    fn test_heading_error_wraps() {
        let profile = Arc::new(MotionProfile::new(vec![Point {
            dt: 0.02,
            heading: TAU - 0.1,
            ..Default::default()
        }]));
        let follower =
            ProfileFollower::new(profile.clone(), profile, &short_profile_params());

        // From target 2pi - 0.1 to heading 0.1 the short way round is +0.2
        let error = follower.gyro_error(0.1, 0.0);
        assert!((error - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_heading_correction_signs() {
        let profile = short_profile();
        let mut follower =
            ProfileFollower::new(profile.clone(), profile, &short_profile_params());

        // Heading 0.1 rad right of the zero target with P = 1: the left
        // setpoint is pulled back and the right pushed forward
        let signal = follower.get(0.1, 0.02);
        assert!((signal.left_setpoint - 0.9).abs() < 1e-12);
        assert!((signal.right_setpoint - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_integral_accumulates_between_calls() {
        let profile = short_profile();
        let params = Params::symmetric(0.0, 0.0, 0.0, 0.0, 1.0);
        let mut follower = ProfileFollower::new(profile.clone(), profile, &params);

        // First call has no previous time, so nothing accumulates
        follower.get(0.1, 0.0);
        assert_eq!(follower.gyro_i_accum(), 0.0);

        // 0.02 s at 0.1 rad of error
        follower.get(0.1, 0.02);
        assert!((follower.gyro_i_accum() - 0.002).abs() < 1e-12);
    }

    #[test]
    fn test_reset_idempotence() {
        let profile = short_profile();
        let params = Params::symmetric(0.01, 0.02, 0.0, 1.0, 0.5);
        let mut used = ProfileFollower::new(profile.clone(), profile.clone(), &params);
        let mut fresh = ProfileFollower::new(profile.clone(), profile, &params);

        used.get(0.3, 0.0);
        used.get(0.2, 0.02);
        used.reset();
        used.reset();

        assert_eq!(used.get(0.1, 0.02), fresh.get(0.1, 0.02));
    }

    #[test]
    fn test_finished_after_longer_side() {
        let profile = short_profile();
        let longer = Arc::new(MotionProfile::new(vec![
            Point {
                dt: 0.02,
                ..Default::default()
            };
            5
        ]));
        let follower = ProfileFollower::new(profile, longer, &short_profile_params());

        assert!((follower.profile_time() - 0.1).abs() < 1e-12);
        assert!(!follower.is_finished(0.1));
        assert!(follower.is_finished(0.11));
    }
}
