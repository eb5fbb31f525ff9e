//! Feed-forward pipeline processors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveData, Processor, TankDriveData};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A [`Processor`] applying velocity, acceleration, and static friction
/// feed-forwards.
///
/// For each side the computed throttle is `k_v * velocity +
/// k_a * acceleration`, plus the velocity intercept with the sign of the
/// velocity whenever the velocity is nonzero. Absent velocities and
/// accelerations contribute nothing. The throttle is *added* to any
/// feed-forward already present, so chained feed-forward processors compose
/// additively; all other fields pass through unchanged.
///
/// No saturation is applied to the summed feed-forward; clamping to the
/// actuator's [-1, 1] range is left to the output stage.
#[derive(Debug, Clone, Copy)]
pub struct FeedForwardProcessor {
    /// The velocity constant feed-forward (kV), in output units per speed
    /// unit
    vel_coeff: f64,

    /// The velocity intercept (VIntercept), in output units
    vel_intercept: f64,

    /// The acceleration constant feed-forward (kA), in output units per
    /// acceleration unit
    accel_coeff: f64,
}

/// A [`Processor`] converting feed-forwards into velocity setpoints.
///
/// Each side's feed-forward is multiplied by the maximum velocity to give a
/// velocity setpoint. This is useful when running closed-loop teleop drive,
/// as operator inputs usually arrive as feed-forwards.
pub struct FeedForwardToVelocityProcessor {
    /// Source of the maximum velocity of the vehicle
    max_velocity_source: Box<dyn FnMut() -> f64>,

    /// Whether to clear the feed-forward fields in the output
    clear_feed_forwards: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeedForwardProcessor {
    /// Create a new `FeedForwardProcessor` with the provided coefficients.
    pub fn new(vel_coeff: f64, vel_intercept: f64, accel_coeff: f64) -> Self {
        Self {
            vel_coeff,
            vel_intercept,
            accel_coeff,
        }
    }

    /// Get the throttle for the wanted speed and acceleration.
    fn throttle(&self, wanted_speed: f64, wanted_accel: f64) -> f64 {
        (self.vel_coeff * wanted_speed)
            + (self.accel_coeff * wanted_accel)
            + if wanted_speed != 0.0 {
                self.vel_intercept.copysign(wanted_speed)
            } else {
                0.0
            }
    }

    /// Apply the feed-forward to one side's data.
    fn apply_side(&self, side: DriveData) -> DriveData {
        side.plus_additional_feed_forward(self.throttle(
            side.velocity.unwrap_or(0.0),
            side.acceleration.unwrap_or(0.0),
        ))
    }
}

impl Processor<TankDriveData> for FeedForwardProcessor {
    type Output = TankDriveData;

    fn apply(&mut self, input: TankDriveData) -> TankDriveData {
        TankDriveData {
            left: self.apply_side(input.left),
            right: self.apply_side(input.right),
            ..input
        }
    }
}

impl FeedForwardToVelocityProcessor {
    /// Create a new `FeedForwardToVelocityProcessor` with a fixed maximum
    /// velocity that clears feed-forwards in the output.
    pub fn new(max_velocity: f64) -> Self {
        Self::from_source(Box::new(move || max_velocity), true)
    }

    /// Create a new `FeedForwardToVelocityProcessor` with a live maximum
    /// velocity source.
    ///
    /// If `clear_feed_forwards` is true the feed-forward fields are absent
    /// in the output, otherwise they are passed through as-is.
    pub fn from_source(
        max_velocity_source: Box<dyn FnMut() -> f64>,
        clear_feed_forwards: bool,
    ) -> Self {
        Self {
            max_velocity_source,
            clear_feed_forwards,
        }
    }
}

impl Processor<TankDriveData> for FeedForwardToVelocityProcessor {
    type Output = TankDriveData;

    fn apply(&mut self, input: TankDriveData) -> TankDriveData {
        let max_velocity = (self.max_velocity_source)();
        let clear = self.clear_feed_forwards;

        input.map_sides(|side| DriveData {
            velocity: Some(side.additional_feed_forward.unwrap_or(0.0) * max_velocity),
            additional_feed_forward: if clear {
                None
            } else {
                side.additional_feed_forward
            },
            ..side
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_throttle_linearity() {
        let ff = FeedForwardProcessor::new(0.1, 0.05, 0.01);

        for &(v, a) in &[(2.0, 1.0), (-3.0, 0.5), (10.0, -2.0)] {
            let expected = 0.1 * v + 0.01 * a + 0.05f64.copysign(v);
            assert!((ff.throttle(v, a) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_no_intercept_at_zero_velocity() {
        let ff = FeedForwardProcessor::new(0.1, 0.05, 0.01);
        assert!((ff.throttle(0.0, 2.0) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_feed_forward_additivity() {
        let mut ff = FeedForwardProcessor::new(0.1, 0.05, 0.0);

        let input = TankDriveData::default().plus_velocities(2.0, 2.0);

        let once = ff.apply(input);
        let twice = ff.apply(once);

        let single = once.left.additional_feed_forward.unwrap();
        let double = twice.left.additional_feed_forward.unwrap();
        assert!((double - 2.0 * single).abs() < 1e-12);
    }

    #[test]
    fn test_other_fields_pass_through() {
        let mut ff = FeedForwardProcessor::new(0.1, 0.05, 0.01);

        let input = TankDriveData::default()
            .plus_positions(1.0, 2.0)
            .with_heading(0.5);
        let output = ff.apply(input);

        assert_eq!(output.left.position, Some(1.0));
        assert_eq!(output.right.position, Some(2.0));
        assert_eq!(output.heading, Some(0.5));
    }

    #[test]
    fn test_feed_forward_to_velocity() {
        let mut processor = FeedForwardToVelocityProcessor::new(4.0);

        let input = TankDriveData::default().plus_additional_feed_forwards(0.5, -0.25);
        let output = processor.apply(input);

        assert_eq!(output.left.velocity, Some(2.0));
        assert_eq!(output.right.velocity, Some(-1.0));
        assert_eq!(output.left.additional_feed_forward, None);
        assert_eq!(output.right.additional_feed_forward, None);
    }
}
