//! # Equipment interface module

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm actuator data model: servos, joint angles, poses and reachability.
pub mod arm;

/// Digital I/O line definitions.
pub mod dio;
