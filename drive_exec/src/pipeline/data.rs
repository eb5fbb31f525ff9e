//! Drive command data passed between pipeline stages

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command data for one side of the drivetrain.
///
/// Each field is independently optional: `None` means "do not command this
/// quantity", which is distinct from commanding zero. Instances are value
/// objects; all mutators return a new instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct DriveData {
    /// The desired position, in position-units.
    pub position: Option<f64>,

    /// The desired velocity, in position-units per second.
    pub velocity: Option<f64>,

    /// The desired acceleration, in position-units per second squared.
    pub acceleration: Option<f64>,

    /// An additional raw amount (from -1 to 1 inclusive) that should be
    /// added to motor throttle after any closed-loop logic.
    pub additional_feed_forward: Option<f64>,
}

/// Command data for the full drivetrain.
///
/// Contains [`DriveData`] for the left and right sides, plus optional
/// heading and turning rate targets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct TankDriveData {
    /// The drive data for the left side.
    pub left: DriveData,

    /// The drive data for the right side.
    pub right: DriveData,

    /// The desired heading in radians from 0 (straight forward) to 2pi,
    /// increasing clockwise.
    pub heading: Option<f64>,

    /// The desired turning rate in radians/second.
    pub turning_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveData {
    /// Create a new `DriveData` with the supplied values.
    pub fn new(
        position: Option<f64>,
        velocity: Option<f64>,
        acceleration: Option<f64>,
        additional_feed_forward: Option<f64>,
    ) -> Self {
        Self {
            position,
            velocity,
            acceleration,
            additional_feed_forward,
        }
    }

    /// Create a new `DriveData` commanding only the provided velocity.
    pub fn with_velocity_only(velocity: f64) -> Self {
        Self {
            velocity: Some(velocity),
            ..Default::default()
        }
    }

    /// Copy of this data with a different position (all other fields remain
    /// the same).
    pub fn with_position(self, position: f64) -> Self {
        Self {
            position: Some(position),
            ..self
        }
    }

    /// Copy of this data with a different velocity.
    pub fn with_velocity(self, velocity: f64) -> Self {
        Self {
            velocity: Some(velocity),
            ..self
        }
    }

    /// Copy of this data with a different acceleration.
    pub fn with_acceleration(self, acceleration: f64) -> Self {
        Self {
            acceleration: Some(acceleration),
            ..self
        }
    }

    /// Copy of this data with a different additional feed-forward.
    pub fn with_additional_feed_forward(self, additional_feed_forward: f64) -> Self {
        Self {
            additional_feed_forward: Some(additional_feed_forward),
            ..self
        }
    }

    /// Copy of this data with the position passed through the given
    /// function.
    pub fn modify_position<F>(self, function: F) -> Self
    where
        F: FnOnce(Option<f64>) -> Option<f64>
    {
        Self {
            position: function(self.position),
            ..self
        }
    }

    /// Copy of this data with the velocity passed through the given
    /// function.
    pub fn modify_velocity<F>(self, function: F) -> Self
    where
        F: FnOnce(Option<f64>) -> Option<f64>
    {
        Self {
            velocity: function(self.velocity),
            ..self
        }
    }

    /// Copy of this data with the acceleration passed through the given
    /// function.
    pub fn modify_acceleration<F>(self, function: F) -> Self
    where
        F: FnOnce(Option<f64>) -> Option<f64>
    {
        Self {
            acceleration: function(self.acceleration),
            ..self
        }
    }

    /// Copy of this data with the additional feed-forward passed through the
    /// given function.
    pub fn modify_additional_feed_forward<F>(self, function: F) -> Self
    where
        F: FnOnce(Option<f64>) -> Option<f64>
    {
        Self {
            additional_feed_forward: function(self.additional_feed_forward),
            ..self
        }
    }

    /// Copy of this data with the provided value added to the position. An
    /// absent position is treated as zero, so the result is always present.
    pub fn plus_position(self, position: f64) -> Self {
        self.modify_position(|old| Some(old.unwrap_or(0.0) + position))
    }

    /// Copy of this data with the provided value added to the velocity. An
    /// absent velocity is treated as zero, so the result is always present.
    pub fn plus_velocity(self, velocity: f64) -> Self {
        self.modify_velocity(|old| Some(old.unwrap_or(0.0) + velocity))
    }

    /// Copy of this data with the provided value added to the acceleration.
    /// An absent acceleration is treated as zero, so the result is always
    /// present.
    pub fn plus_acceleration(self, acceleration: f64) -> Self {
        self.modify_acceleration(|old| Some(old.unwrap_or(0.0) + acceleration))
    }

    /// Copy of this data with the provided value added to the additional
    /// feed-forward. An absent feed-forward is treated as zero, so the
    /// result is always present.
    pub fn plus_additional_feed_forward(self, additional_feed_forward: f64) -> Self {
        self.modify_additional_feed_forward(
            |old| Some(old.unwrap_or(0.0) + additional_feed_forward))
    }
}

impl TankDriveData {
    /// Create a new `TankDriveData` with the supplied values.
    pub fn new(
        left: DriveData,
        right: DriveData,
        heading: Option<f64>,
        turning_rate: Option<f64>,
    ) -> Self {
        Self {
            left,
            right,
            heading,
            turning_rate,
        }
    }

    /// Copy of this data with a different heading target.
    pub fn with_heading(self, heading: f64) -> Self {
        Self {
            heading: Some(heading),
            ..self
        }
    }

    /// Copy of this data with a different turning rate target.
    pub fn with_turning_rate(self, turning_rate: f64) -> Self {
        Self {
            turning_rate: Some(turning_rate),
            ..self
        }
    }

    /// Copy of this data with both sides passed through the given function.
    pub fn map_sides<F>(self, function: F) -> Self
    where
        F: Fn(DriveData) -> DriveData
    {
        Self {
            left: function(self.left),
            right: function(self.right),
            ..self
        }
    }

    /// Copy of this data with the provided values added to the left and
    /// right positions respectively.
    pub fn plus_positions(self, left_position: f64, right_position: f64) -> Self {
        Self {
            left: self.left.plus_position(left_position),
            right: self.right.plus_position(right_position),
            ..self
        }
    }

    /// Copy of this data with the provided values added to the left and
    /// right velocities respectively.
    pub fn plus_velocities(self, left_velocity: f64, right_velocity: f64) -> Self {
        Self {
            left: self.left.plus_velocity(left_velocity),
            right: self.right.plus_velocity(right_velocity),
            ..self
        }
    }

    /// Copy of this data with the provided values added to the left and
    /// right additional feed-forwards respectively.
    pub fn plus_additional_feed_forwards(
        self,
        left_additional_feed_forward: f64,
        right_additional_feed_forward: f64,
    ) -> Self {
        Self {
            left: self.left
                .plus_additional_feed_forward(left_additional_feed_forward),
            right: self.right
                .plus_additional_feed_forward(right_additional_feed_forward),
            ..self
        }
    }
}

impl fmt::Display for DriveData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (name, value) in &[
            ("position", self.position),
            ("velocity", self.velocity),
            ("acceleration", self.acceleration),
            ("feedforward", self.additional_feed_forward),
        ] {
            if let Some(v) = value {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", name, v)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TankDriveData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "left: {}, right: {}", self.left, self.right)?;
        if let Some(heading) = self.heading {
            write!(f, ", heading {}", heading)?;
        }
        if let Some(turning_rate) = self.turning_rate {
            write!(f, ", turning rate {}", turning_rate)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_with_leaves_other_fields() {
        let data = DriveData::default()
            .with_velocity(3.0)
            .with_position(1.0);

        assert_eq!(data.position, Some(1.0));
        assert_eq!(data.velocity, Some(3.0));
        assert_eq!(data.acceleration, None);
        assert_eq!(data.additional_feed_forward, None);
    }

    #[test]
    fn test_plus_seeds_absent_fields() {
        // Adding to an absent field behaves as adding to zero
        let data = DriveData::default().plus_velocity(2.0);
        assert_eq!(data.velocity, Some(2.0));

        // Adding to a present field sums
        let data = data.plus_velocity(-5.0);
        assert_eq!(data.velocity, Some(-3.0));
    }

    #[test]
    fn test_plus_zero_remains_commanded() {
        // A zero command is still a command, not an absence
        let data = DriveData::default().with_position(0.0).plus_position(0.0);
        assert_eq!(data.position, Some(0.0));
    }

    #[test]
    fn test_modify_can_clear() {
        let data = DriveData::default()
            .with_additional_feed_forward(0.5)
            .modify_additional_feed_forward(|_| None);
        assert_eq!(data.additional_feed_forward, None);
    }

    #[test]
    fn test_tank_plus_sides_independent() {
        let data = TankDriveData::default().plus_positions(-1.0, 1.0);
        assert_eq!(data.left.position, Some(-1.0));
        assert_eq!(data.right.position, Some(1.0));
    }

    #[test]
    fn test_display_lists_present_fields_only() {
        let data = DriveData::default().with_velocity(2.0);
        assert_eq!(format!("{}", data), "velocity 2");
    }
}
