//! # Digital I/O line definitions

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the digital I/O lines available on the arm.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum DioId {
    /// Buzzer line, high = on
    Buzzer,

    /// Pump enable line, high = pump on
    PumpEn,

    /// Valve enable line, high = valve open
    ValveEn,

    /// Gripper line, low = catch
    Gripper,

    /// Head limit switch, input, low = pressed
    LimitSw,
}
