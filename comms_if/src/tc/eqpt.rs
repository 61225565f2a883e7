//! # Equipment telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

use crate::eqpt::arm::ServoId;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An equipment command acting directly on a servo or digital I/O line.
#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub enum EqptCmd {
    /// Attach (power) a servo, seeding its demand from the measured angle.
    #[structopt(name = "attach")]
    Attach {
        /// The servo to attach.
        servo: ServoId,
    },

    /// Detach (unpower) a servo, leaving it free to move.
    #[structopt(name = "detach")]
    Detach {
        /// The servo to detach.
        servo: ServoId,
    },

    /// Open or close the gripper.
    #[structopt(name = "gripper")]
    Gripper {
        /// Close the gripper if set, open it otherwise.
        #[structopt(long)]
        closed: bool,
    },

    /// Switch the suction pump on or off.
    #[structopt(name = "pump")]
    Pump {
        /// Switch the pump on if set, off otherwise.
        #[structopt(long)]
        on: bool,
    },

    /// Sound the buzzer.
    #[structopt(name = "buzzer")]
    Buzzer {
        /// Tone frequency in hertz.
        freq_hz: f64,

        /// Duration of the tone in seconds.
        duration_s: f64,
    },

    /// Start or stop recording the arm's pose each cycle.
    #[structopt(name = "record")]
    Record {
        /// Start a new recording if set, stop and finalise the current one
        /// otherwise.
        #[structopt(long)]
        on: bool,
    },

    /// Play the recorded pose sequence back through the servos.
    #[structopt(name = "play")]
    Play,
}
