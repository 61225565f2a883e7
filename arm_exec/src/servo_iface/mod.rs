//! # Servo Interface Module
//!
//! This module provides a unified servo access interface which can abstract
//! over different servo back ends. The executable normally runs against the
//! simulated bank, hardware back ends implement the same trait.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulated servo bank back end.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use sim::SimServoBank;

use comms_if::eqpt::arm::{ArmDems, ServoId};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of analog feedback reads taken per angle measurement.
pub const NUM_ANALOG_READS: usize = 8;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing the arm's servos.
pub trait ServoIf {
    /// Attach (power) a servo so it holds and follows demands.
    fn attach(&mut self, servo: ServoId) -> Result<(), ServoIfError>;

    /// Detach (unpower) a servo, leaving it free to be moved by hand.
    fn detach(&mut self, servo: ServoId) -> Result<(), ServoIfError>;

    /// True if the servo is currently attached.
    fn is_attached(&self, servo: ServoId) -> bool;

    /// Demand an angular position from a servo.
    fn write_angle(&mut self, servo: ServoId, angle_deg: f64) -> Result<(), ServoIfError>;

    /// Measure a servo's angular position from its analog feedback.
    ///
    /// Works whether or not the servo is attached, so a detached arm can be
    /// posed by hand and read back.
    fn read_angle(&mut self, servo: ServoId) -> Result<f64, ServoIfError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoIfError {
    #[error("Cannot write to {0:?} while it is detached")]
    NotAttached(ServoId),

    #[error("Servo feedback read failed for {0:?}")]
    ReadFailed(ServoId),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a set of demands to the servo bank.
///
/// Demands to detached servos are skipped with a warning rather than failing
/// the whole set.
pub fn apply_dems(servo_if: &mut dyn ServoIf, dems: &ArmDems) {
    for (servo, angle_deg) in dems.pos_deg.iter() {
        match servo_if.write_angle(*servo, *angle_deg) {
            Ok(()) => (),
            Err(e) => log::warn!("Demand dropped: {}", e),
        }
    }
}

/// Filter a set of raw analog reads into a single count.
///
/// Sorts the reads and averages the middle four, discarding outliers at both
/// ends.
pub fn filter_analog_reads(reads: &[u16; NUM_ANALOG_READS]) -> f64 {
    let mut sorted = *reads;
    sorted.sort_unstable();

    let middle = &sorted[2..6];

    middle.iter().map(|r| *r as f64).sum::<f64>() / middle.len() as f64
}
