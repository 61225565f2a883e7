//! # Data Store

use comms_if::{eqpt::arm::ArmDems, tc::eqpt::EqptCmd};

use crate::motion_sched::{self, MotionSched};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session-elapsed time of the current cycle
    pub elapsed_s: f64,

    // MotionSched
    pub motion_sched: MotionSched,
    pub motion_sched_input: motion_sched::InputData,
    pub motion_sched_output: ArmDems,
    pub motion_sched_status_rpt: motion_sched::StatusReport,

    /// Equipment commands received this cycle, executed against the servo
    /// bank and digital I/O after TC processing
    pub eqpt_cmds: Vec<EqptCmd>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Clear per-cycle items at the start of a cycle.
    pub fn cycle_start(&mut self, elapsed_s: f64) {
        self.elapsed_s = elapsed_s;
        self.motion_sched_input = motion_sched::InputData {
            cmd: None,
            elapsed_s,
        };
        self.eqpt_cmds.clear();
    }
}
