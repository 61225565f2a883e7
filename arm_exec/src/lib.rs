//! # Arm library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the arm executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Servo calibration - converts analog feedback counts into joint angles
pub mod calib;

/// Global data store shared between the executable's modules
pub mod data_store;

/// Digital I/O - buzzer, pump, valve, gripper and limit switch access
pub mod dio;

/// Kinematics - inverse/forward solutions and envelope validation
pub mod kinematics;

/// Motion scheduler - plans and cooperatively executes motion commands
pub mod motion_sched;

/// Pose recording - records pose sequences to a page device for playback
pub mod recording;

/// Servo interface - unified access to the arm's servo back ends
pub mod servo_iface;

/// Trajectory planning - eased interpolation into fixed sample buffers
pub mod traj_plan;
