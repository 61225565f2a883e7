//! Inverse kinematics calculation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::Params;
use comms_if::eqpt::arm::{CartPos, JointAngles, DEG_PER_RAD};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest coordinate magnitude accepted by the solver. Inputs beyond this
/// are clamped before solving.
///
/// Units: millimeters
const MAX_COORD_MM: f64 = 3276.0;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Calculate the joint angles placing the head at the given cartesian
/// position.
///
/// Returns `None` if no real solution exists, either because the target is in
/// the excluded rear half-plane (`y < 0`) or because the two-link geometry
/// cannot span the required distance.
///
/// The returned angles are not checked against the joint limits, use
/// [`super::validate`] for that.
pub fn calc_joint_angles(pos: &CartPos, params: &Params) -> Option<JointAngles> {
    // Clamp to the solver's coordinate range, then truncate to the servo's
    // 0.1 mm positioning resolution
    let x = trunc_tenth_mm(util::maths::clamp(&pos.x, &-MAX_COORD_MM, &MAX_COORD_MM));
    let y = trunc_tenth_mm(util::maths::clamp(&pos.y, &-MAX_COORD_MM, &MAX_COORD_MM));
    let z = trunc_tenth_mm(util::maths::clamp(&pos.z, &-MAX_COORD_MM, &MAX_COORD_MM));

    // The rear half-plane is excluded, the base servo cannot rotate past the
    // mounting plane
    if y < 0.0 {
        return None;
    }

    // Base rotation and the normalised horizontal reach of the two-link
    // planar chain. Reach is normalised by the lower arm length so the
    // triangle solve below works with a unit lower arm.
    let base_deg: f64;
    let x_in: f64;

    if x == 0.0 {
        base_deg = 90.0;
        x_in = (y - params.wrist_offset_mm) / params.lower_arm_mm;
    } else {
        base_deg = (y / x).atan() * DEG_PER_RAD + if x < 0.0 { 180.0 } else { 0.0 };
        x_in = (x / (base_deg / DEG_PER_RAD).cos() - params.wrist_offset_mm)
            / params.lower_arm_mm;
    }

    let z_in = (z - params.base_height_mm) / params.lower_arm_mm;

    // Solve the planar triangle formed by the two links and the line from
    // shoulder axis to wrist, then rotate by the line's elevation
    let phi_deg = (z_in / x_in).atan() * DEG_PER_RAD;
    let d = x_in.hypot(z_in);
    let k = params.upper_arm_mm / params.lower_arm_mm;

    let elbow_deg =
        ((d * d + k * k - 1.0) / (2.0 * k * d)).acos() * DEG_PER_RAD - phi_deg;
    let shoulder_deg =
        ((d * d + 1.0 - k * k) / (2.0 * d)).acos() * DEG_PER_RAD + phi_deg;

    let angles = JointAngles::new(base_deg, shoulder_deg, elbow_deg);

    // An unspannable triangle drives the acos arguments outside [-1, 1]
    if angles.any_nan() {
        None
    } else {
        Some(angles)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Truncate a coordinate to 0.1 mm resolution.
fn trunc_tenth_mm(coord_mm: f64) -> f64 {
    (coord_mm * 10.0).trunc() / 10.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_trunc_tenth_mm() {
        assert_eq!(trunc_tenth_mm(123.456), 123.4);
        assert_eq!(trunc_tenth_mm(-123.456), -123.4);
        assert_eq!(trunc_tenth_mm(0.0), 0.0);
    }
}
