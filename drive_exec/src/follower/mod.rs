//! # Profile follower module
//!
//! The profile follower executes a precomputed motion profile pair. Each
//! tick the caller passes in the current gyro heading and the time since
//! execution began; the follower looks up the executing profile point on
//! each side, runs a PI loop on the wraparound-safe heading error, and
//! returns per-side position setpoints with feed-forward throttle bumps.
//!
//! The output of the heading PI loop is added to the profile's position
//! setpoints (subtracted on the left, added on the right, so that a
//! rightwards correction shortens left travel and lengthens right travel).
//! Velocity, acceleration, and static friction feed-forwards are layered on
//! as a throttle bump, intended for an actuator-native position loop with
//! an arbitrary feed-forward input, though the output can equally drive a
//! software position loop.
//!
//! The follower is stateful: it tracks the time of the last call and an
//! integral accumulator for the heading loop. When using one instance for
//! multiple runs, call `reset` before beginning the second and subsequent
//! runs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use state::*;
