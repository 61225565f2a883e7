//! Forward kinematics calculation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::Params;
use comms_if::eqpt::arm::{CartPos, JointAngles, DEG_PER_RAD};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Calculate the cartesian position of the head for the given joint angles.
///
/// This is the exact inverse of [`super::calc_joint_angles`] up to the
/// solver's 0.1 mm truncation, so the scheduler can recover the head position
/// from any joint sample.
pub fn calc_head_pos(angles: &JointAngles, params: &Params) -> CartPos {
    let stretch_mm = params.lower_arm_mm * (angles.shoulder_deg / DEG_PER_RAD).cos()
        + params.upper_arm_mm * (angles.elbow_deg / DEG_PER_RAD).cos()
        + params.wrist_offset_mm;

    let height_mm = params.lower_arm_mm * (angles.shoulder_deg / DEG_PER_RAD).sin()
        - params.upper_arm_mm * (angles.elbow_deg / DEG_PER_RAD).sin()
        + params.base_height_mm;

    CartPos::new(
        stretch_mm * (angles.base_deg / DEG_PER_RAD).cos(),
        stretch_mm * (angles.base_deg / DEG_PER_RAD).sin(),
        height_mm,
    )
}
