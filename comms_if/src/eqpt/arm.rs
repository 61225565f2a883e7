//! # Arm Equipment Data Model
//!
//! Shared data types describing the arm's actuators and pose. Angles are
//! always expressed in degrees at this boundary, positions in millimeters.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of servos on the arm.
pub const NUM_SERVOS: usize = 4;

/// The number of rotational axes in the arm's kinematic chain (the hand servo
/// sits outside the chain).
pub const NUM_KIN_AXES: usize = 3;

/// The fixed radians to degrees conversion constant used throughout the
/// kinematic calculations.
pub const DEG_PER_RAD: f64 = 57.2958;

/// The servos forming the kinematic chain, in (base, shoulder, elbow) order.
pub const KIN_CHAIN_IDS: [ServoId; NUM_KIN_AXES] =
    [ServoId::Base, ServoId::Shoulder, ServoId::Elbow];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A cartesian position of the arm's head.
///
/// Units: millimeters
pub type CartPos = Vector3<f64>;

/// The angular positions of the three kinematic-chain joints.
///
/// Units: degrees
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct JointAngles {
    pub base_deg: f64,
    pub shoulder_deg: f64,
    pub elbow_deg: f64,
}

/// A polar pose of the arm's head: radial stretch, base rotation and height.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct PolarPos {
    /// Horizontal distance from the base axis to the head.
    ///
    /// Units: millimeters
    pub stretch_mm: f64,

    /// Rotation of the base joint.
    ///
    /// Units: degrees
    pub rotation_deg: f64,

    /// Height of the head above the arm's mounting plane.
    ///
    /// Units: millimeters
    pub height_mm: f64,
}

/// Demands that are sent to the actuator interface for execution.
///
/// Servos absent from the map are left at their previous demand.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ArmDems {
    /// The demanded position of a servo in degrees.
    pub pos_deg: HashMap<ServoId, f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all servos on the arm
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ServoId {
    /// Base rotation servo
    Base,
    /// Shoulder (lower arm) servo
    Shoulder,
    /// Elbow (upper arm) servo
    Elbow,
    /// Hand (wrist rotation) servo
    Hand,
}

/// The outcome of checking a target against the arm's reachable envelope.
///
/// "No real solution" and "solution exists but violates a limit" are distinct
/// outcomes and shall never be collapsed into a boolean.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Copy, Clone)]
pub enum Reachability {
    /// The target is reachable.
    InRange,

    /// The geometry has a valid solution but at least one joint limit is
    /// exceeded.
    OutOfRange,

    /// No real kinematic solution exists for the target.
    OutOfRangeNoSolution,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl JointAngles {
    pub fn new(base_deg: f64, shoulder_deg: f64, elbow_deg: f64) -> Self {
        Self {
            base_deg,
            shoulder_deg,
            elbow_deg,
        }
    }

    /// True if any of the joint angles is not a number.
    pub fn any_nan(&self) -> bool {
        self.base_deg.is_nan() || self.shoulder_deg.is_nan() || self.elbow_deg.is_nan()
    }

    /// The largest absolute angular excursion between two joint triples.
    ///
    /// Units: degrees
    pub fn max_excursion_deg(&self, other: &Self) -> f64 {
        (self.base_deg - other.base_deg)
            .abs()
            .max((self.shoulder_deg - other.shoulder_deg).abs())
            .max((self.elbow_deg - other.elbow_deg).abs())
    }
}

impl ServoId {
    /// All servo IDs in calibration-table order.
    pub fn all() -> [ServoId; NUM_SERVOS] {
        [
            ServoId::Base,
            ServoId::Shoulder,
            ServoId::Elbow,
            ServoId::Hand,
        ]
    }

    /// Index of this servo into calibration tables.
    pub fn index(&self) -> usize {
        match self {
            ServoId::Base => 0,
            ServoId::Shoulder => 1,
            ServoId::Elbow => 2,
            ServoId::Hand => 3,
        }
    }
}

impl FromStr for ServoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(ServoId::Base),
            "shoulder" => Ok(ServoId::Shoulder),
            "elbow" => Ok(ServoId::Elbow),
            "hand" => Ok(ServoId::Hand),
            _ => Err(format!("Unknown servo ID \"{}\"", s)),
        }
    }
}

impl PolarPos {
    /// Convert this polar pose into a cartesian position.
    pub fn to_cart(&self) -> CartPos {
        CartPos::new(
            self.stretch_mm * (self.rotation_deg / DEG_PER_RAD).cos(),
            self.stretch_mm * (self.rotation_deg / DEG_PER_RAD).sin(),
            self.height_mm,
        )
    }

    /// Build a polar pose from a cartesian position.
    pub fn from_cart(cart: &CartPos) -> Self {
        Self {
            stretch_mm: cart.x.hypot(cart.y),
            rotation_deg: cart.y.atan2(cart.x) * DEG_PER_RAD,
            height_mm: cart.z,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_polar_cart_round_trip() {
        let polar = PolarPos {
            stretch_mm: 200.0,
            rotation_deg: 60.0,
            height_mm: 120.0,
        };

        let round_trip = PolarPos::from_cart(&polar.to_cart());

        assert!((round_trip.stretch_mm - polar.stretch_mm).abs() < 1e-9);
        assert!((round_trip.rotation_deg - polar.rotation_deg).abs() < 1e-3);
        assert!((round_trip.height_mm - polar.height_mm).abs() < 1e-9);
    }

    #[test]
    fn test_max_excursion() {
        let a = JointAngles::new(10.0, 20.0, 30.0);
        let b = JointAngles::new(15.0, 60.0, 25.0);

        assert_eq!(a.max_excursion_deg(&b), 40.0);
    }
}
