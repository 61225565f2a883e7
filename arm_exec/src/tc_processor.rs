//! # Telecommand processor module
//!
//! The telecommand processor routes TCs coming from any source to the module
//! that executes them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use arm_lib::data_store::DataStore;
use arm_lib::motion_sched::StatusReport;
use comms_if::tc::{Tc, TcResponse};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    match tc {
        Tc::Motion(cmd) => {
            debug!("Recieved motion command: {:?}", cmd);

            // Only one motion command can enter the scheduler per cycle, a
            // second in the same cycle overwrites the first
            if ds.motion_sched_input.cmd.is_some() {
                warn!("Multiple motion commands in one cycle, only the last is kept");
            }

            ds.motion_sched_input.cmd = Some(cmd.clone());
        }

        Tc::Eqpt(cmd) => {
            debug!("Recieved equipment command: {:?}", cmd);
            ds.eqpt_cmds.push(cmd.clone());
        }
    }
}

/// Derive the TC response for a motion command from the scheduler's status
/// report for the cycle it was processed in.
pub(crate) fn motion_response(report: &StatusReport) -> Option<TcResponse> {
    if report.busy_rejected {
        return Some(TcResponse::Busy);
    }

    report.reachability.map(|verdict| match verdict {
        comms_if::eqpt::arm::Reachability::InRange => TcResponse::Accepted,
        other => TcResponse::Rejected(other),
    })
}
