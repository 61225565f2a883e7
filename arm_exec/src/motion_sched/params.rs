//! Parameters structure for MotionSched

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::kinematics;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for the motion scheduler.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    // ---- CAPABILITIES ----
    /// Minimum head speed, slower demands are raised to this.
    ///
    /// Units: millimeters/second
    pub min_speed_mms: f64,

    /// Maximum head speed, faster demands are lowered to this.
    ///
    /// Units: millimeters/second
    pub max_speed_mms: f64,

    // ---- GEOMETRY ----
    /// Arm geometry and mechanical envelope.
    pub kinematics: kinematics::Params,
}
