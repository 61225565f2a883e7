//! # Kinematics module
//!
//! Closed-form inverse and forward kinematics for the three joint arm, plus
//! validation of joint angles against the mechanical envelope.
//!
//! All angles at this boundary are in degrees and all positions in
//! millimeters, matching the servo hardware. Conversions use the shared
//! [`DEG_PER_RAD`] constant so both directions agree exactly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod forward;
mod inverse;
mod limits;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
pub use forward::*;
pub use inverse::*;
pub use limits::*;
pub use params::*;

use comms_if::eqpt::arm::{CartPos, JointAngles, Reachability};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check whether a cartesian target can be reached by the arm.
///
/// Distinguishes between targets with no real solution and targets whose
/// solution violates a joint limit.
pub fn check_target(pos: &CartPos, params: &Params) -> Reachability {
    match calc_joint_angles(pos, params) {
        Some(angles) => validate(&angles, params),
        None => Reachability::OutOfRangeNoSolution,
    }
}

/// Forward solve paired with an envelope verdict on the input angles.
pub fn check_pose(angles: &JointAngles, params: &Params) -> (CartPos, Reachability) {
    (calc_head_pos(angles, params), validate(angles, params))
}
