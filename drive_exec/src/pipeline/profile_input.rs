//! Pipeline input producing drive commands from a motion profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::Arc;

// Internal
use super::{DriveData, Input, TankDriveData};
use crate::profile::MotionProfile;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An [`Input`] producing a [`TankDriveData`] from a pair of motion
/// profiles.
///
/// Each tick the profiles are sampled at the clock's elapsed time, giving
/// position, velocity, and acceleration commands per side plus the heading
/// target from the left-side point. The clock must read zero when profile
/// execution begins; reset it (and any downstream stateful processors)
/// before reusing the input for a second run.
pub struct ProfileInput {
    left: Arc<MotionProfile>,
    right: Arc<MotionProfile>,

    /// Elapsed seconds since profile execution began
    clock: Box<dyn FnMut() -> f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ProfileInput {
    /// Create a new `ProfileInput` over the given profile pair.
    pub fn new(
        left: Arc<MotionProfile>,
        right: Arc<MotionProfile>,
        clock: Box<dyn FnMut() -> f64>,
    ) -> Self {
        Self { left, right, clock }
    }
}

impl Input for ProfileInput {
    type Output = TankDriveData;

    fn get(&mut self) -> TankDriveData {
        let time_s = (self.clock)();

        let left_point = *self.left.point_at(time_s);
        let right_point = *self.right.point_at(time_s);

        TankDriveData::new(
            DriveData::new(
                Some(left_point.position),
                Some(left_point.velocity),
                Some(left_point.acceleration),
                None,
            ),
            DriveData::new(
                Some(right_point.position),
                Some(right_point.velocity),
                Some(right_point.acceleration),
                None,
            ),
            Some(left_point.heading),
            None,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::profile::Point;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ramp_profile() -> Arc<MotionProfile> {
        Arc::new(MotionProfile::new(
            (0..5)
                .map(|i| Point {
                    dt: 0.02,
                    position: i as f64,
                    velocity: 50.0,
                    heading: 0.25,
                    ..Default::default()
                })
                .collect(),
        ))
    }

    #[test]
    fn test_tracks_clock() {
        let profile = ramp_profile();
        let time = Rc::new(Cell::new(0.0));
        let time_clone = time.clone();

        let mut input = ProfileInput::new(
            profile.clone(),
            profile,
            Box::new(move || time_clone.get()),
        );

        let data = input.get();
        assert_eq!(data.left.position, Some(0.0));
        assert_eq!(data.heading, Some(0.25));

        time.set(0.04);
        let data = input.get();
        assert_eq!(data.left.position, Some(2.0));
        assert_eq!(data.right.position, Some(2.0));
        assert_eq!(data.left.velocity, Some(50.0));
        assert_eq!(data.left.additional_feed_forward, None);
    }
}
