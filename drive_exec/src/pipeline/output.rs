//! Pipeline output issuing per-side setpoints

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveData, Output, TankDriveData};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The boundary to one side's lower-level motor control.
///
/// Implementations hand the position setpoint to the actuator's native
/// closed loop and layer the feed-forward bump (in fractions of full
/// throttle, -1 to 1) on top. Units of the position setpoint are
/// caller-defined but must match the profile's position units.
///
/// Plain closures `FnMut(f64, f64)` implement this trait.
pub trait SetpointSink {
    /// Command the side with a position setpoint and a feed-forward bump.
    fn set(&mut self, position_setpoint: f64, feed_forward_bump: f64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An [`Output`] dispatching a [`TankDriveData`] to two [`SetpointSink`]s.
///
/// Each side is commanded only when its position is present ("absent" means
/// "do not command", not "command zero"); an absent feed-forward is sent as
/// zero bump.
pub struct SetpointOutput<L, R> {
    left: L,
    right: R,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<F> SetpointSink for F
where
    F: FnMut(f64, f64)
{
    fn set(&mut self, position_setpoint: f64, feed_forward_bump: f64) {
        self(position_setpoint, feed_forward_bump)
    }
}

impl<L, R> SetpointOutput<L, R>
where
    L: SetpointSink,
    R: SetpointSink,
{
    /// Create a new `SetpointOutput` over the two sides' sinks.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L, R> Output<TankDriveData> for SetpointOutput<L, R>
where
    L: SetpointSink,
    R: SetpointSink,
{
    fn accept(&mut self, value: TankDriveData) {
        set_side(&mut self.left, &value.left);
        set_side(&mut self.right, &value.right);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Command one side's sink from its drive data, if a position is commanded.
fn set_side<S: SetpointSink>(sink: &mut S, side: &DriveData) {
    if let Some(position) = side.position {
        sink.set(position, side.additional_feed_forward.unwrap_or(0.0));
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_dispatches_both_sides() {
        let left = Rc::new(Cell::new((0.0, 0.0)));
        let right = Rc::new(Cell::new((0.0, 0.0)));
        let left_clone = left.clone();
        let right_clone = right.clone();

        let mut output = SetpointOutput::new(
            move |p: f64, b: f64| left_clone.set((p, b)),
            move |p: f64, b: f64| right_clone.set((p, b)),
        );

        let data = TankDriveData::default()
            .plus_positions(1.0, 2.0)
            .plus_additional_feed_forwards(0.1, -0.1);
        output.accept(data);

        assert_eq!(left.get(), (1.0, 0.1));
        assert_eq!(right.get(), (2.0, -0.1));
    }

    #[test]
    fn test_absent_position_not_commanded() {
        let calls = Rc::new(Cell::new(0u32));
        let calls_clone = calls.clone();

        let mut output = SetpointOutput::new(
            move |_p: f64, _b: f64| calls_clone.set(calls_clone.get() + 1),
            |_p: f64, _b: f64| (),
        );

        output.accept(TankDriveData::default());
        assert_eq!(calls.get(), 0);
    }
}
