//! # Telecommand module
//!
//! This module provides the telecommand definitions shared between the command
//! dispatcher and the motion-control core, along with JSON parsing of incoming
//! commands and the responses sent back for each one.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Motion telecommands: cartesian and polar moves plus stop.
pub mod motion;

/// Equipment telecommands: servo attach/detach, gripper, pump, buzzer and
/// pose recording.
pub mod eqpt;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;
use thiserror::Error;

use crate::eqpt::arm::Reachability;
use eqpt::EqptCmd;
use motion::MotionCmd;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the arm by the user or a script.
#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub enum Tc {
    /// A motion command handled by the motion scheduler.
    #[structopt(name = "motion")]
    Motion(MotionCmd),

    /// An equipment command handled directly by the equipment interfaces.
    #[structopt(name = "eqpt")]
    Eqpt(EqptCmd),
}

/// The response issued for every received telecommand.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum TcResponse {
    /// The TC was accepted and is being executed.
    Accepted,

    /// The TC was rejected because its target cannot be reached.
    Rejected(Reachability),

    /// The TC was rejected because a motion is already executing.
    Busy,

    /// The TC could not be executed because of an internal error.
    Failed,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Serialise this TC into a JSON packet.
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}
