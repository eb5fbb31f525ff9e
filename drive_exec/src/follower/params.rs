//! Parameters structure for the profile follower

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the profile follower.
///
/// The feed-forward coefficients are independently settable per side, since
/// the two sides of a drivetrain rarely behave identically.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Params {

    // ---- FEED-FORWARD ----

    /// The left velocity coefficient (kV).
    ///
    /// Units: bump units per profile unit per second
    pub l_vel_coeff: f64,

    /// The left velocity intercept (VIntercept).
    ///
    /// Units: bump units
    pub l_vel_intercept: f64,

    /// The left acceleration coefficient (kA).
    ///
    /// Units: bump units per profile unit per second squared
    pub l_accel_coeff: f64,

    /// The right velocity coefficient (kV).
    ///
    /// Units: bump units per profile unit per second
    pub r_vel_coeff: f64,

    /// The right velocity intercept (VIntercept).
    ///
    /// Units: bump units
    pub r_vel_intercept: f64,

    /// The right acceleration coefficient (kA).
    ///
    /// Units: bump units per profile unit per second squared
    pub r_accel_coeff: f64,

    // ---- HEADING LOOP ----

    /// The P coefficient for the heading controller.
    ///
    /// Units: profile units per radian
    pub heading_k_p: f64,

    /// The I coefficient for the heading controller.
    ///
    /// Units: profile units per radian-second
    pub heading_k_i: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Create a parameter set with identical feed-forward coefficients on
    /// both sides.
    pub fn symmetric(
        vel_coeff: f64,
        vel_intercept: f64,
        accel_coeff: f64,
        heading_k_p: f64,
        heading_k_i: f64,
    ) -> Self {
        Self {
            l_vel_coeff: vel_coeff,
            l_vel_intercept: vel_intercept,
            l_accel_coeff: accel_coeff,
            r_vel_coeff: vel_coeff,
            r_vel_intercept: vel_intercept,
            r_accel_coeff: accel_coeff,
            heading_k_p,
            heading_k_i,
        }
    }
}
