//! # Communications interface crate.
//!
//! Provides all common interfaces between the command dispatcher and the
//! motion-control core of the arm software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommand definitions
pub mod tc;

/// Command and data definitions for equipment (servos and digital I/O)
pub mod eqpt;
