//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the arm software from the `ARM_SW_ROOT`
/// environment variable.
pub fn get_arm_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("ARM_SW_ROOT")?))
}
