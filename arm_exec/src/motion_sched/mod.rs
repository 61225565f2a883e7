//! # Motion scheduler module
//!
//! Owns the arm's motion state machine. Accepts motion commands, plans
//! trajectories for them and executes the plans cooperatively, applying at
//! most one trajectory sample per cycle so the main loop never blocks on a
//! motion.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod plan;
mod state;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
pub use params::*;
pub use plan::*;
pub use state::*;

use comms_if::eqpt::arm::Reachability;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Top level mode of the motion scheduler.
#[derive(Debug, Clone, Copy, Eq, PartialEq, serde::Serialize)]
pub enum SchedMode {
    /// No motion in progress, commands are accepted.
    Idle,

    /// A command is being turned into a trajectory.
    PathPlanning,

    /// A trajectory is being executed, new motion commands are rejected.
    Executing,
}

impl Default for SchedMode {
    fn default() -> Self {
        SchedMode::Idle
    }
}

/// Possible errors that can occur during MotionSched operation.
#[derive(Debug, thiserror::Error)]
pub enum MotionSchedError {
    #[error("No valid arm pose available, attach the servos before commanding a motion")]
    NoPose,

    #[error("Executing trajectory stepped outside the mechanical envelope ({0:?})")]
    StepOutOfRange(Reachability),
}
