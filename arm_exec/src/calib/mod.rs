//! # Servo calibration module
//!
//! Converts between the raw analog feedback counts read from the servo
//! potentiometers and joint angles in degrees. Each servo carries a linear
//! calibration from the factory plus a manual trim offset set during
//! assembly.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use comms_if::eqpt::arm::{ServoId, NUM_SERVOS};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Linear calibration of a single servo's analog feedback.
///
/// `angle_deg = intercept_deg + slope_deg_per_count * analog_count`
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct LinearCal {
    /// Angle at zero analog counts.
    ///
    /// Units: degrees
    pub intercept_deg: f64,

    /// Angle change per analog count.
    ///
    /// Units: degrees/count
    pub slope_deg_per_count: f64,
}

/// Calibration set for the whole arm, indexed by [`ServoId::index`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CalibSet {
    /// Linear calibration per servo.
    pub linear: [LinearCal; NUM_SERVOS],

    /// Manual trim offset added to the calibrated angle per servo.
    ///
    /// Units: degrees
    pub manual_trim_deg: [f64; NUM_SERVOS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CalibSet {
    /// Convert an analog feedback count into a joint angle.
    pub fn angle_from_analog(&self, servo: ServoId, analog_count: f64) -> f64 {
        let cal = &self.linear[servo.index()];

        cal.intercept_deg
            + cal.slope_deg_per_count * analog_count
            + self.manual_trim_deg[servo.index()]
    }

    /// Convert a joint angle into the analog feedback count that would
    /// produce it. Inverse of [`CalibSet::angle_from_analog`].
    pub fn analog_from_angle(&self, servo: ServoId, angle_deg: f64) -> f64 {
        let cal = &self.linear[servo.index()];

        (angle_deg - self.manual_trim_deg[servo.index()] - cal.intercept_deg)
            / cal.slope_deg_per_count
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_calib() -> CalibSet {
        CalibSet {
            linear: [LinearCal {
                intercept_deg: -10.0,
                slope_deg_per_count: 0.3,
            }; NUM_SERVOS],
            manual_trim_deg: [0.0, 1.5, -0.5, 0.0],
        }
    }

    #[test]
    fn test_angle_from_analog() {
        let calib = test_calib();

        // 300 counts: -10 + 0.3 * 300 + 1.5 trim
        assert!((calib.angle_from_analog(ServoId::Shoulder, 300.0) - 81.5).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let calib = test_calib();

        for servo in ServoId::all().iter() {
            let analog = calib.analog_from_angle(*servo, 90.0);
            let angle = calib.angle_from_analog(*servo, analog);

            assert!((angle - 90.0).abs() < 1e-9);
        }
    }
}
