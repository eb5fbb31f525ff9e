//! Unit and convention transform pipeline processors

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveData, Processor, TankDriveData};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A [`Processor`] scaling positions, velocities, and accelerations between
/// unit systems.
///
/// Positions are multiplied by the distance factor; velocities and
/// accelerations are multiplied by the distance factor and divided by the
/// time factor. Absent fields stay absent, and feed-forward, heading, and
/// turning rate pass through unaffected.
#[derive(Debug, Clone, Copy)]
pub struct UnitScaler {
    /// Scale factor from input distance units to output distance units
    distance_factor: f64,

    /// Scale factor from input time units to output time units
    time_factor: f64,
}

/// A [`Processor`] converting a present heading between the [0, 2pi) and
/// [-pi, pi) conventions by shifting it half a revolution.
#[derive(Debug, Clone, Copy)]
pub struct HeadingTransformProcessor {
    /// If true, convert [-pi, pi) headings to [0, 2pi); if false, the
    /// reverse
    output_positive: bool,

    /// If true angles are radians, otherwise degrees
    radians: bool,
}

/// A [`Processor`] deriving a turning rate from the difference of the side
/// velocities.
///
/// The turning rate is only computable when both side velocities are
/// present; otherwise the data passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct VelocityToTurningRateProcessor {
    /// Distance between the left and right wheels
    track_width: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl UnitScaler {
    /// Create a new `UnitScaler` with the given factors.
    pub fn new(distance_factor: f64, time_factor: f64) -> Self {
        Self {
            distance_factor,
            time_factor,
        }
    }

    fn scale_side(&self, side: DriveData) -> DriveData {
        DriveData {
            position: side.position.map(|p| p * self.distance_factor),
            velocity: side
                .velocity
                .map(|v| v * self.distance_factor / self.time_factor),
            acceleration: side
                .acceleration
                .map(|a| a * self.distance_factor / self.time_factor),
            additional_feed_forward: side.additional_feed_forward,
        }
    }
}

impl Processor<TankDriveData> for UnitScaler {
    type Output = TankDriveData;

    fn apply(&mut self, input: TankDriveData) -> TankDriveData {
        TankDriveData {
            left: self.scale_side(input.left),
            right: self.scale_side(input.right),
            ..input
        }
    }
}

impl HeadingTransformProcessor {
    /// Create a new `HeadingTransformProcessor` operating on radians.
    ///
    /// If `output_positive` is true, headings on [-pi, pi) are converted to
    /// [0, 2pi); if false, the reverse.
    pub fn new(output_positive: bool) -> Self {
        Self::with_units(output_positive, true)
    }

    /// Create a new `HeadingTransformProcessor` specifying the angular
    /// units.
    pub fn with_units(output_positive: bool, radians: bool) -> Self {
        Self {
            output_positive,
            radians,
        }
    }
}

impl Processor<TankDriveData> for HeadingTransformProcessor {
    type Output = TankDriveData;

    fn apply(&mut self, input: TankDriveData) -> TankDriveData {
        match input.heading {
            Some(heading) => {
                let half_circle = if self.radians {
                    std::f64::consts::PI
                } else {
                    180.0
                };
                let sign = if self.output_positive { 1.0 } else { -1.0 };

                input.with_heading(heading + sign * half_circle)
            }
            None => input,
        }
    }
}

impl VelocityToTurningRateProcessor {
    /// Create a new `VelocityToTurningRateProcessor` for a vehicle with the
    /// given track width.
    pub fn new(track_width: f64) -> Self {
        Self { track_width }
    }
}

impl Processor<TankDriveData> for VelocityToTurningRateProcessor {
    type Output = TankDriveData;

    fn apply(&mut self, input: TankDriveData) -> TankDriveData {
        match (input.left.velocity, input.right.velocity) {
            (Some(left_velocity), Some(right_velocity)) => {
                input.with_turning_rate((right_velocity - left_velocity) / self.track_width)
            }
            // Rate not computable with only one side commanded
            _ => input,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unit_scaler_factors() {
        let mut scaler = UnitScaler::new(10.0, 2.0);

        let input = TankDriveData::default()
            .plus_positions(1.0, 2.0)
            .plus_velocities(4.0, 8.0);
        let output = scaler.apply(input);

        assert_eq!(output.left.position, Some(10.0));
        assert_eq!(output.right.position, Some(20.0));
        assert_eq!(output.left.velocity, Some(20.0));
        assert_eq!(output.right.velocity, Some(40.0));
    }

    #[test]
    fn test_unit_scaler_absent_stays_absent() {
        let mut scaler = UnitScaler::new(10.0, 2.0);

        let output = scaler.apply(TankDriveData::default());

        assert_eq!(output.left.position, None);
        assert_eq!(output.left.velocity, None);
        assert_eq!(output.left.acceleration, None);
    }

    #[test]
    fn test_heading_transform_round_trip() {
        const PI: f64 = std::f64::consts::PI;

        let mut to_positive = HeadingTransformProcessor::new(true);
        let mut to_signed = HeadingTransformProcessor::new(false);

        let input = TankDriveData::default().with_heading(-PI / 2.0);
        let positive = to_positive.apply(input);
        assert_eq!(positive.heading, Some(PI / 2.0));

        let back = to_signed.apply(positive);
        assert_eq!(back.heading, Some(-PI / 2.0));
    }

    #[test]
    fn test_velocity_to_turning_rate() {
        let mut processor = VelocityToTurningRateProcessor::new(0.5);

        let input = TankDriveData::default().plus_velocities(1.0, 2.0);
        let output = processor.apply(input);

        assert_eq!(output.turning_rate, Some(2.0));
    }

    #[test]
    fn test_velocity_to_turning_rate_partial_presence() {
        let mut processor = VelocityToTurningRateProcessor::new(0.5);

        let input = TankDriveData {
            left: DriveData::with_velocity_only(1.0),
            ..Default::default()
        };
        let output = processor.apply(input);

        assert_eq!(output, input);
    }
}
