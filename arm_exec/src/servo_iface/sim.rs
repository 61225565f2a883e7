//! Simulated servo bank

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::{filter_analog_reads, ServoIf, ServoIfError, NUM_ANALOG_READS};
use crate::calib::CalibSet;
use comms_if::eqpt::arm::{ServoId, NUM_SERVOS};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Analog jitter applied to successive simulated feedback reads.
///
/// Units: counts
const READ_JITTER: [i32; NUM_ANALOG_READS] = [0, 2, -1, 1, -2, 0, 1, -1];

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Simulated bank of the arm's four servos.
///
/// Attached servos move instantly to their demand. Feedback reads are
/// generated from the physical angle through the calibration's inverse, with
/// deterministic jitter, so the read path exercises the same filtering as a
/// real bank.
pub struct SimServoBank {
    calib: CalibSet,

    attached: [bool; NUM_SERVOS],

    /// The angle each servo is physically at.
    ///
    /// Units: degrees
    physical_deg: [f64; NUM_SERVOS],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimServoBank {
    /// Create a new bank with all servos detached at the given angles.
    pub fn new(calib: CalibSet, initial_deg: [f64; NUM_SERVOS]) -> Self {
        Self {
            calib,
            attached: [false; NUM_SERVOS],
            physical_deg: initial_deg,
        }
    }

    /// Pose a servo by hand, as if the detached arm were moved physically.
    pub fn set_physical_angle(&mut self, servo: ServoId, angle_deg: f64) {
        self.physical_deg[servo.index()] = angle_deg;
    }
}

impl ServoIf for SimServoBank {
    fn attach(&mut self, servo: ServoId) -> Result<(), ServoIfError> {
        self.attached[servo.index()] = true;
        Ok(())
    }

    fn detach(&mut self, servo: ServoId) -> Result<(), ServoIfError> {
        self.attached[servo.index()] = false;
        Ok(())
    }

    fn is_attached(&self, servo: ServoId) -> bool {
        self.attached[servo.index()]
    }

    fn write_angle(&mut self, servo: ServoId, angle_deg: f64) -> Result<(), ServoIfError> {
        if !self.attached[servo.index()] {
            return Err(ServoIfError::NotAttached(servo));
        }

        self.physical_deg[servo.index()] = angle_deg;
        Ok(())
    }

    fn read_angle(&mut self, servo: ServoId) -> Result<f64, ServoIfError> {
        let analog = self.calib.analog_from_angle(servo, self.physical_deg[servo.index()]);

        let mut reads = [0u16; NUM_ANALOG_READS];
        for (read, jitter) in reads.iter_mut().zip(READ_JITTER.iter()) {
            *read = (analog + *jitter as f64).max(0.0) as u16;
        }

        Ok(self.calib.angle_from_analog(servo, filter_analog_reads(&reads)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calib::LinearCal;

    fn test_bank() -> SimServoBank {
        let calib = CalibSet {
            linear: [LinearCal {
                intercept_deg: 0.0,
                slope_deg_per_count: 0.25,
            }; NUM_SERVOS],
            manual_trim_deg: [0.0; NUM_SERVOS],
        };

        SimServoBank::new(calib, [90.0; NUM_SERVOS])
    }

    #[test]
    fn test_write_requires_attach() {
        let mut bank = test_bank();

        assert!(matches!(
            bank.write_angle(ServoId::Base, 45.0),
            Err(ServoIfError::NotAttached(ServoId::Base))
        ));

        bank.attach(ServoId::Base).unwrap();
        bank.write_angle(ServoId::Base, 45.0).unwrap();

        // Filtered feedback reproduces the demand within the analog
        // quantisation
        let read = bank.read_angle(ServoId::Base).unwrap();
        assert!((read - 45.0).abs() < 0.5);
    }

    #[test]
    fn test_detached_read_back() {
        let mut bank = test_bank();

        // A detached servo posed by hand must still read back
        bank.set_physical_angle(ServoId::Elbow, 72.0);

        let read = bank.read_angle(ServoId::Elbow).unwrap();
        assert!((read - 72.0).abs() < 0.5);
    }
}
