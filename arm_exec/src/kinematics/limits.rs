//! Joint limit validation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::Params;
use comms_if::eqpt::arm::{JointAngles, Reachability};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Validate a set of joint angles against the arm's mechanical envelope.
///
/// Angles containing NaN always map to `OutOfRangeNoSolution`, a real
/// solution outside a limit maps to `OutOfRange`. Validation never mutates
/// the angles, so validating twice gives the same verdict.
pub fn validate(angles: &JointAngles, params: &Params) -> Reachability {
    if angles.any_nan() {
        return Reachability::OutOfRangeNoSolution;
    }

    if angles.base_deg < params.base_min_deg || angles.base_deg > params.base_max_deg {
        return Reachability::OutOfRange;
    }

    if angles.shoulder_deg < params.shoulder_min_deg
        || angles.shoulder_deg > params.shoulder_max_deg
    {
        return Reachability::OutOfRange;
    }

    if angles.elbow_deg < params.elbow_min_deg || angles.elbow_deg > params.elbow_max_deg {
        return Reachability::OutOfRange;
    }

    // The links are mechanically coupled, the angle between them must stay
    // open enough to avoid a self-collision
    let coupled_deg = 180.0 - angles.shoulder_deg - angles.elbow_deg;

    if coupled_deg < params.coupled_min_deg || coupled_deg > params.coupled_max_deg {
        return Reachability::OutOfRange;
    }

    Reachability::InRange
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            lower_arm_mm: 148.25,
            upper_arm_mm: 160.2,
            base_height_mm: 90.0,
            wrist_offset_mm: 21.17,
            base_min_deg: 0.0,
            base_max_deg: 180.0,
            shoulder_min_deg: 5.0,
            shoulder_max_deg: 120.0,
            elbow_min_deg: 5.0,
            elbow_max_deg: 120.0,
            coupled_min_deg: 30.0,
            coupled_max_deg: 150.0,
        }
    }

    #[test]
    fn test_validate_in_range() {
        let params = test_params();

        assert_eq!(
            validate(&JointAngles::new(90.0, 60.0, 50.0), &params),
            Reachability::InRange
        );
    }

    #[test]
    fn test_validate_joint_limit() {
        let params = test_params();

        // Shoulder beyond its upper limit
        assert_eq!(
            validate(&JointAngles::new(90.0, 130.0, 20.0), &params),
            Reachability::OutOfRange
        );

        // Individually valid joints whose coupled angle is too closed
        assert_eq!(
            validate(&JointAngles::new(90.0, 110.0, 60.0), &params),
            Reachability::OutOfRange
        );
    }

    #[test]
    fn test_validate_nan() {
        let params = test_params();

        assert_eq!(
            validate(&JointAngles::new(90.0, f64::NAN, 50.0), &params),
            Reachability::OutOfRangeNoSolution
        );
    }

    #[test]
    fn test_validate_idempotent() {
        let params = test_params();
        let angles = JointAngles::new(90.0, 130.0, 20.0);

        let first = validate(&angles, &params);
        let second = validate(&angles, &params);

        assert_eq!(first, second);
    }
}
