//! # Motion profile module
//!
//! A motion profile is a precomputed, time-indexed sequence of samples
//! describing an intended motion for one side of the drivetrain. Profiles
//! are produced ahead of time by an external trajectory generator and are
//! read-only once loaded; generation is out of scope for this software.
//!
//! Lookup by elapsed time assumes the samples are uniformly spaced at the
//! first sample's time step. Profiles with non-uniform spacing will be
//! mis-indexed silently, so generators must emit a constant time step.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod container;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
pub use container::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sample within a [`MotionProfile`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The time change since the previous sample, in seconds.
    pub dt: f64,

    /// The x-position of the vehicle in profile units, or 0 if not
    /// applicable.
    pub x: f64,

    /// The y-position of the vehicle in profile units, or 0 if not
    /// applicable.
    pub y: f64,

    /// The position of the profiled side, in profile units.
    pub position: f64,

    /// The velocity of the profiled side, in profile units per second.
    pub velocity: f64,

    /// The acceleration of the profiled side, in profile units per second
    /// squared.
    pub acceleration: f64,

    /// The jerk of the profiled side, in profile units per second cubed.
    pub jerk: f64,

    /// The vehicle's heading in radians, or 0 if not applicable.
    pub heading: f64,
}

/// An ordered sequence of [`Point`]s executed by a profile follower.
///
/// Profiles are not validated on construction: a profile with no points, or
/// whose first point has a zero time step, will produce non-finite lookup
/// indices. Callers must validate profiles before executing them.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionProfile {
    points: Vec<Point>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionProfile {
    /// Create a new `MotionProfile` from a sequence of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Get the nth point (0-indexed) in the profile.
    ///
    /// # Panics
    /// - If `index >= len()`.
    pub fn get(&self, index: usize) -> &Point {
        &self.points[index]
    }

    /// Get the number of points in the profile.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return true if the profile contains no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the point executing at the given time since profile start.
    ///
    /// The index is the elapsed time divided by the *first* point's time
    /// step, rounded to nearest and clamped to the final point. This is an
    /// approximation which is only correct for uniformly spaced profiles;
    /// it is kept in preference to a cumulative-time search because every
    /// supported generator emits constant spacing.
    pub fn point_at(&self, time_s: f64) -> &Point {
        // Start from the current time and find the closest point.
        let start_index = (time_s / self.points[0].dt).round() as i64;

        let last_index = self.points.len() as i64 - 1;

        &self.points[start_index.clamp(0, last_index) as usize]
    }

    /// Get the total time to execute the profile, in seconds.
    pub fn duration(&self) -> f64 {
        self.points.iter().map(|p| p.dt).sum()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
