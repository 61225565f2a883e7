//! Parameters structure for the kinematics module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters describing the arm's geometry and mechanical envelope.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Length of the lower arm link, shoulder axis to elbow axis.
    ///
    /// Units: millimeters
    pub lower_arm_mm: f64,

    /// Length of the upper arm link, elbow axis to wrist.
    ///
    /// Units: millimeters
    pub upper_arm_mm: f64,

    /// Height of the shoulder axis above the mounting plane.
    ///
    /// Units: millimeters
    pub base_height_mm: f64,

    /// Horizontal offset from the wrist to the head reference point.
    ///
    /// Units: millimeters
    pub wrist_offset_mm: f64,

    // ---- JOINT LIMITS ----
    /// Minimum base rotation.
    ///
    /// Units: degrees
    pub base_min_deg: f64,

    /// Maximum base rotation.
    ///
    /// Units: degrees
    pub base_max_deg: f64,

    /// Minimum shoulder angle.
    ///
    /// Units: degrees
    pub shoulder_min_deg: f64,

    /// Maximum shoulder angle.
    ///
    /// Units: degrees
    pub shoulder_max_deg: f64,

    /// Minimum elbow angle.
    ///
    /// Units: degrees
    pub elbow_min_deg: f64,

    /// Maximum elbow angle.
    ///
    /// Units: degrees
    pub elbow_max_deg: f64,

    /// Minimum of the coupled angle between the two links,
    /// `180 - shoulder - elbow`.
    ///
    /// Units: degrees
    pub coupled_min_deg: f64,

    /// Maximum of the coupled angle between the two links.
    ///
    /// Units: degrees
    pub coupled_max_deg: f64,
}
