//! # Motion telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A motion command that can be completed by the motion scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
pub enum MotionCmd {
    /// Move the head to a cartesian target position.
    #[structopt(name = "move_to")]
    MoveTo {
        /// Target x coordinate in millimeters.
        x_mm: f64,

        /// Target y coordinate in millimeters.
        y_mm: f64,

        /// Target z coordinate in millimeters.
        z_mm: f64,

        /// Hand servo angle in degrees, left unchanged if not given.
        #[structopt(long)]
        hand_deg: Option<f64>,

        /// Interpret the target as an offset from the current position.
        #[structopt(long)]
        relative: bool,

        /// Head speed in millimeters per second.
        #[structopt(long, default_value = "200.0")]
        speed_mms: f64,

        /// Easing profile applied along the path.
        #[structopt(long, default_value = "smooth")]
        easing: Easing,

        /// If the target has no solution, move to the closest reachable point
        /// instead of rejecting the command.
        #[structopt(long)]
        closest_point: bool,
    },

    /// Move the head to a polar target position.
    #[structopt(name = "move_polar")]
    MovePolar {
        /// Target radial stretch in millimeters.
        stretch_mm: f64,

        /// Target base rotation in degrees.
        rotation_deg: f64,

        /// Target height in millimeters.
        height_mm: f64,

        /// Hand servo angle in degrees, left unchanged if not given.
        #[structopt(long)]
        hand_deg: Option<f64>,

        /// Interpret the target as an offset from the current position.
        #[structopt(long)]
        relative: bool,

        /// Head speed in millimeters per second.
        #[structopt(long, default_value = "200.0")]
        speed_mms: f64,

        /// Easing profile applied along the path.
        #[structopt(long, default_value = "smooth")]
        easing: Easing,

        /// If the target has no solution, move to the closest reachable point
        /// instead of rejecting the command.
        #[structopt(long)]
        closest_point: bool,
    },

    /// Stop the arm, abandoning any in-progress motion and holding the
    /// current joint angles.
    #[structopt(name = "stop")]
    Stop,
}

/// Easing profiles available to motion commands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub enum Easing {
    /// Constant progression along the path.
    Linear,

    /// Quadratic acceleration from standstill.
    EaseIn,

    /// Quadratic deceleration to standstill.
    EaseOut,

    /// Quadratic acceleration then deceleration.
    EaseInOut,

    /// Cubic smoothstep, zero velocity at both ends.
    Smooth,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Easing {
    fn default() -> Self {
        Easing::Smooth
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Easing::Linear),
            "ease_in" => Ok(Easing::EaseIn),
            "ease_out" => Ok(Easing::EaseOut),
            "ease_in_out" => Ok(Easing::EaseInOut),
            "smooth" => Ok(Easing::Smooth),
            _ => Err(format!("Unknown easing profile \"{}\"", s)),
        }
    }
}
