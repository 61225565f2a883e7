//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Equipment command execution
//!         - Motion scheduler processing
//!         - Servo demand execution
//!
//! # Modules
//!
//! All control modules (e.g. `motion_sched`) shall meet the following
//! requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{
    calib::CalibSet,
    data_store::DataStore,
    dio::{self, BuzzerCtrl, DioIf, SimDio},
    recording::{MemDevice, PoseFrame, PoseRecorder},
    servo_iface::{self, ServoIf, SimServoBank},
};
use comms_if::{
    eqpt::arm::{JointAngles, ServoId, KIN_CHAIN_IDS},
    eqpt::dio::DioId,
    tc::{eqpt::EqptCmd, TcResponse},
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    raise_error,
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Limit of consecutive cycle overruns before the executable aborts.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 500;

/// Joint angles the simulated arm starts at, a comfortable pose well inside
/// the envelope.
const INITIAL_POSE_DEG: [f64; 4] = [90.0, 60.0, 50.0, 90.0];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pose recording/playback state of the main loop.
#[derive(Clone, Copy, PartialEq)]
enum RecState {
    Off,

    /// The current pose is appended to the recording each cycle.
    Recording,

    /// One recorded frame is driven onto the servos each cycle.
    Playing,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let calib: CalibSet =
        util::params::load("calib.toml").wrap_err("Could not load calibration params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument is the script path, scripts are the only TC source
    let mut script = if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            si.get_duration(),
            si.get_num_tcs()
        );

        si
    } else {
        return Err(eyre!(
            "Expected a single script path argument, found {} arguments",
            args.len() - 1
        ));
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.motion_sched
        .init("motion_sched.toml", &session)
        .wrap_err("Failed to initialise MotionSched")?;
    info!("MotionSched init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    let mut servo_bank = SimServoBank::new(calib, INITIAL_POSE_DEG);
    let mut sim_dio = SimDio::default();
    let mut buzzer = BuzzerCtrl::default();
    let mut recorder = PoseRecorder::new(MemDevice::default());
    let mut rec_state = RecState::Off;

    // Gripper line is active low, drive it high so the gripper starts open
    dio::set_gripper(&mut sim_dio, false);

    // Attach all servos and seed the scheduler's pose from the measured
    // angles, so motion starts from wherever the arm actually is
    for servo in ServoId::all().iter() {
        servo_bank
            .attach(*servo)
            .wrap_err("Failed to attach servos")?;
    }

    seed_pose(&mut ds, &mut servo_bank)?;

    info!("Equipment initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(session::get_elapsed_seconds());

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- EQUIPMENT COMMAND EXECUTION ----

        let eqpt_cmds = std::mem::take(&mut ds.eqpt_cmds);
        for cmd in eqpt_cmds.iter() {
            exec_eqpt_cmd(
                &mut ds,
                cmd,
                &mut servo_bank,
                &mut sim_dio,
                &mut buzzer,
                &mut recorder,
                &mut rec_state,
            )?;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // MotionSched processing
        match ds.motion_sched.proc(&ds.motion_sched_input) {
            Ok((o, r)) => {
                ds.motion_sched_output = o;
                ds.motion_sched_status_rpt = r;
            }
            Err(e) => {
                // MotionSched errors usually just mean you sent the wrong TC,
                // so just issue the warning and continue.
                warn!("Error during MotionSched processing: {}", e)
            }
        };

        // Log the response to any motion command processed this cycle
        if ds.motion_sched_input.cmd.is_some() {
            match tc_processor::motion_response(&ds.motion_sched_status_rpt) {
                Some(TcResponse::Accepted) => info!("Motion TC accepted"),
                Some(response) => warn!("Motion TC response: {:?}", response),
                None => (),
            }
        }

        // Send demands to the servos
        servo_iface::apply_dems(&mut servo_bank, &ds.motion_sched_output);

        // Buzzer timing
        buzzer.proc(&mut sim_dio, ds.elapsed_s);

        // ---- POSE RECORDING ----

        match rec_state {
            RecState::Recording => {
                if let (Some(angles), Some(hand_deg)) = (
                    ds.motion_sched.current_angles(),
                    ds.motion_sched.current_hand_deg(),
                ) {
                    // Gripper line is active low
                    let gripper_closed = !sim_dio.read_line(DioId::Gripper);
                    let frame = PoseFrame::from_angles(&angles, hand_deg, gripper_closed);

                    if let Err(e) = recorder.record(&frame) {
                        warn!("Recording stopped: {}", e);
                        recorder.finish().wrap_err("Failed to finish the recording")?;
                        rec_state = RecState::Off;
                    }
                }
            }

            RecState::Playing => match recorder.next_frame() {
                Ok(Some(frame)) => {
                    for servo in ServoId::all().iter() {
                        if let Err(e) =
                            servo_bank.write_angle(*servo, frame.angles_deg[servo.index()] as f64)
                        {
                            warn!("Playback halted: {}", e);
                            rec_state = RecState::Off;
                            break;
                        }
                    }

                    if rec_state == RecState::Playing {
                        dio::set_gripper(&mut sim_dio, frame.gripper_closed);
                    }
                }
                Ok(None) => {
                    info!("Pose playback complete");
                    rec_state = RecState::Off;

                    // The servos were driven behind the scheduler's back,
                    // re-seed its pose from the measured angles
                    seed_pose(&mut ds, &mut servo_bank)?;
                }
                Err(e) => {
                    warn!("Playback failed: {}", e);
                    rec_state = RecState::Off;
                }
            },

            RecState::Off => (),
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.motion_sched.write() {
            warn!("Failed to write archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    raise_error!(
                        "More than {} consecutive cycle overruns",
                        MAX_CONSEC_CYCLE_OVERRUNS
                    );
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Seed the motion scheduler's pose from the measured servo angles.
fn seed_pose(ds: &mut DataStore, servo_bank: &mut SimServoBank) -> Result<(), Report> {
    let mut angles = [0.0; 3];

    for (i, servo) in KIN_CHAIN_IDS.iter().enumerate() {
        angles[i] = servo_bank
            .read_angle(*servo)
            .wrap_err("Failed to read servo angles")?;
    }

    let hand_deg = servo_bank
        .read_angle(ServoId::Hand)
        .wrap_err("Failed to read the hand servo angle")?;

    ds.motion_sched.set_pose(
        JointAngles::new(angles[0], angles[1], angles[2]),
        hand_deg,
    );

    Ok(())
}

/// Execute a single equipment command against the servo bank and digital
/// I/O.
fn exec_eqpt_cmd(
    ds: &mut DataStore,
    cmd: &EqptCmd,
    servo_bank: &mut SimServoBank,
    sim_dio: &mut SimDio,
    buzzer: &mut BuzzerCtrl,
    recorder: &mut PoseRecorder<MemDevice>,
    rec_state: &mut RecState,
) -> Result<(), Report> {
    match cmd {
        EqptCmd::Attach { servo } => {
            servo_bank
                .attach(*servo)
                .wrap_err("Failed to attach servo")?;
            info!("{:?} attached", servo);

            // Re-seed the pose, the arm may have been posed by hand while
            // detached
            seed_pose(ds, servo_bank)?;
        }

        EqptCmd::Detach { servo } => {
            servo_bank
                .detach(*servo)
                .wrap_err("Failed to detach servo")?;
            info!("{:?} detached", servo);
        }

        EqptCmd::Gripper { closed } => {
            dio::set_gripper(sim_dio, *closed);
            info!("Gripper {}", if *closed { "closed" } else { "open" });
        }

        EqptCmd::Pump { on } => {
            dio::set_pump(sim_dio, *on);
            info!("Pump {}", if *on { "on" } else { "off" });
        }

        EqptCmd::Buzzer {
            freq_hz,
            duration_s,
        } => {
            buzzer.start(sim_dio, *freq_hz, *duration_s, ds.elapsed_s);
        }

        EqptCmd::Record { on } => {
            if *on {
                recorder.rewind();
                *rec_state = RecState::Recording;
                info!("Pose recording started");
            } else {
                if *rec_state == RecState::Recording {
                    recorder.finish().wrap_err("Failed to finish the recording")?;
                    info!("Pose recording finished");
                }
                *rec_state = RecState::Off;
            }
        }

        EqptCmd::Play => {
            // Playback drives the servos directly, it must not fight an
            // executing motion
            if !ds.motion_sched.is_available() {
                warn!("Playback rejected, a motion is executing");
            } else {
                if *rec_state == RecState::Recording {
                    recorder.finish().wrap_err("Failed to finish the recording")?;
                }

                recorder.rewind();
                *rec_state = RecState::Playing;
                info!("Pose playback started");
            }
        }
    }

    Ok(())
}
