//! Telecommand generator.
//!
//! Builds a TC from command line arguments and prints its JSON form, for
//! pasting into TC scripts. For example:
//!
//! ```shell
//! tc_gen motion move_to 0 200 150 --speed-mms 150 --easing smooth
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Report};
use structopt::StructOpt;

use comms_if::tc::Tc;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let tc = Tc::from_args();

    println!(
        "{}",
        tc.to_json().wrap_err("Could not serialise the TC")?
    );

    Ok(())
}
