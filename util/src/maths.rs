//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the smallest signed error between a heading and a target heading.
///
/// The returned error is `heading - target` mapped onto (-pi, pi], so the
/// result is always the shortest signed angular path from the target to the
/// heading, no matter which wrapping convention ([0, 2pi) or [-pi, pi)) the
/// inputs use.
pub fn ang_err<T>(heading: T, target: T) -> T
where
    T: Float
{
    // basically magic https://stackoverflow.com/a/2007279
    (heading - target).sin().atan2((heading - target).cos())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}
