//! End to end scenarios for the motion scheduler, driven through the public
//! library interface the way the executable drives it.

use arm_lib::{
    calib::{CalibSet, LinearCal},
    kinematics,
    motion_sched::{InputData, MotionSched, Params, SchedMode},
    recording::{MemDevice, PoseFrame, PoseRecorder},
    servo_iface::{ServoIf, SimServoBank},
};
use comms_if::eqpt::arm::{CartPos, JointAngles, Reachability, ServoId, NUM_SERVOS};
use comms_if::tc::motion::{Easing, MotionCmd};
use util::module::State;

/// Cycle period the executable runs at.
const CYCLE_PERIOD_S: f64 = 0.02;

fn test_params() -> Params {
    Params {
        min_speed_mms: 100.0,
        max_speed_mms: 1000.0,
        kinematics: kinematics::Params {
            lower_arm_mm: 148.25,
            upper_arm_mm: 160.2,
            base_height_mm: 90.0,
            wrist_offset_mm: 21.17,
            base_min_deg: 0.0,
            base_max_deg: 180.0,
            shoulder_min_deg: 5.0,
            shoulder_max_deg: 120.0,
            elbow_min_deg: 5.0,
            elbow_max_deg: 120.0,
            coupled_min_deg: 30.0,
            coupled_max_deg: 150.0,
        },
    }
}

/// Build a scheduler seeded at a known-good pose.
fn seeded_sched() -> MotionSched {
    let params = test_params();
    let pos = CartPos::new(0.0, 200.0, 100.0);
    let angles = kinematics::calc_joint_angles(&pos, &params.kinematics).unwrap();

    let mut sched = MotionSched::with_params(params);
    sched.set_pose(angles, 90.0);

    sched
}

fn move_to(x: f64, y: f64, z: f64, easing: Easing) -> MotionCmd {
    MotionCmd::MoveTo {
        x_mm: x,
        y_mm: y,
        z_mm: z,
        hand_deg: None,
        relative: false,
        speed_mms: 200.0,
        easing,
        closest_point: false,
    }
}

/// Run the scheduler at the given cycle rate until the motion completes,
/// returning the elapsed time at completion.
fn run_to_completion(sched: &mut MotionSched, mut elapsed_s: f64, cycle_period_s: f64) -> f64 {
    for _ in 0..50_000 {
        elapsed_s += cycle_period_s;
        let (_, report) = sched
            .proc(&InputData {
                cmd: None,
                elapsed_s,
            })
            .unwrap();

        if report.motion_complete {
            return elapsed_s;
        }
    }

    panic!("Motion did not complete");
}

#[test]
fn cartesian_move_converges_on_target() {
    let mut sched = seeded_sched();
    let target = CartPos::new(50.0, 200.0, 150.0);

    let (_, report) = sched
        .proc(&InputData {
            cmd: Some(move_to(target.x, target.y, target.z, Easing::Smooth)),
            elapsed_s: 0.0,
        })
        .unwrap();

    assert_eq!(report.reachability, Some(Reachability::InRange));

    run_to_completion(&mut sched, 0.0, CYCLE_PERIOD_S);

    let pos = sched.current_pos().unwrap();
    assert!(
        (pos - target).norm() < 0.5,
        "Finished {:.2} mm from the target",
        (pos - target).norm()
    );
}

#[test]
fn motion_duration_tracks_speed() {
    // The same move at twice the speed should finish in roughly half the
    // time. Cycled fast enough that the sample schedule, not the cycle
    // rate, limits progress.
    let target = CartPos::new(0.0, 300.0, 100.0);
    let fast_cycle_s = 0.005;

    let mut durations = vec![];

    for speed_mms in [200.0f64, 400.0].iter() {
        let mut sched = seeded_sched();

        sched
            .proc(&InputData {
                cmd: Some(MotionCmd::MoveTo {
                    x_mm: target.x,
                    y_mm: target.y,
                    z_mm: target.z,
                    hand_deg: None,
                    relative: false,
                    speed_mms: *speed_mms,
                    easing: Easing::Linear,
                    closest_point: false,
                }),
                elapsed_s: 0.0,
            })
            .unwrap();

        durations.push(run_to_completion(&mut sched, 0.0, fast_cycle_s));
    }

    assert!(
        durations[0] > durations[1] * 1.5,
        "Expected {:.2} s to be well above {:.2} s",
        durations[0],
        durations[1]
    );
}

#[test]
fn busy_then_stop_then_new_move() {
    let mut sched = seeded_sched();

    sched
        .proc(&InputData {
            cmd: Some(move_to(50.0, 200.0, 150.0, Easing::Smooth)),
            elapsed_s: 0.0,
        })
        .unwrap();

    assert!(!sched.is_available());

    // Second command while executing is rejected busy
    let (_, report) = sched
        .proc(&InputData {
            cmd: Some(move_to(0.0, 220.0, 100.0, Easing::Smooth)),
            elapsed_s: CYCLE_PERIOD_S,
        })
        .unwrap();
    assert!(report.busy_rejected);

    // Stop interrupts the motion
    let (_, report) = sched
        .proc(&InputData {
            cmd: Some(MotionCmd::Stop),
            elapsed_s: 2.0 * CYCLE_PERIOD_S,
        })
        .unwrap();
    assert_eq!(report.mode, SchedMode::Idle);
    assert!(sched.is_available());

    // A new move is accepted immediately after the stop
    let (_, report) = sched
        .proc(&InputData {
            cmd: Some(move_to(0.0, 220.0, 100.0, Easing::Smooth)),
            elapsed_s: 3.0 * CYCLE_PERIOD_S,
        })
        .unwrap();
    assert_eq!(report.reachability, Some(Reachability::InRange));
}

#[test]
fn hand_angle_readable_through_interface() {
    let mut sched = seeded_sched();

    // Seeded hand angle is visible before any motion
    assert_eq!(sched.current_hand_deg(), Some(90.0));

    sched
        .proc(&InputData {
            cmd: Some(MotionCmd::MoveTo {
                x_mm: 50.0,
                y_mm: 200.0,
                z_mm: 150.0,
                hand_deg: Some(45.0),
                relative: false,
                speed_mms: 200.0,
                easing: Easing::Linear,
                closest_point: false,
            }),
            elapsed_s: 0.0,
        })
        .unwrap();

    run_to_completion(&mut sched, 0.0, CYCLE_PERIOD_S);

    // The commanded hand angle is reported once the motion has applied it
    assert_eq!(sched.current_hand_deg(), Some(45.0));
}

#[test]
fn polar_sweep_uses_joint_space_fallback() {
    let params = test_params();
    let start_pos = CartPos::new(150.0, 20.0, 100.0);
    let start_angles = kinematics::calc_joint_angles(&start_pos, &params.kinematics).unwrap();

    let mut sched = MotionSched::with_params(params);
    sched.set_pose(start_angles, 90.0);

    // Sweeping the base across the front passes too close to the base axis
    // for a straight-line path
    let (_, report) = sched
        .proc(&InputData {
            cmd: Some(move_to(-150.0, 20.0, 100.0, Easing::Smooth)),
            elapsed_s: 0.0,
        })
        .unwrap();

    assert_eq!(report.reachability, Some(Reachability::InRange));
    assert!(report.joint_space_fallback);

    run_to_completion(&mut sched, 0.0, CYCLE_PERIOD_S);

    let pos = sched.current_pos().unwrap();
    assert!((pos - CartPos::new(-150.0, 20.0, 100.0)).norm() < 0.5);
}

#[test]
fn recorded_motion_plays_back() {
    let mut sched = seeded_sched();
    let mut recorder = PoseRecorder::new(MemDevice::default());

    sched
        .proc(&InputData {
            cmd: Some(move_to(50.0, 200.0, 150.0, Easing::Linear)),
            elapsed_s: 0.0,
        })
        .unwrap();

    // Record the pose after every applied sample
    let mut elapsed_s = 0.0;
    let mut recorded = 0;

    for _ in 0..50_000 {
        elapsed_s += CYCLE_PERIOD_S;
        let (_, report) = sched
            .proc(&InputData {
                cmd: None,
                elapsed_s,
            })
            .unwrap();

        if report.step_applied {
            let frame =
                PoseFrame::from_angles(&sched.current_angles().unwrap(), 90.0, false);
            recorder.record(&frame).unwrap();
            recorded += 1;
        }

        if report.motion_complete {
            break;
        }
    }

    recorder.finish().unwrap();
    assert!(recorded > 0);

    // Play the recording back and check it ends at the target
    recorder.rewind();

    let mut last_frame = None;
    while let Some(frame) = recorder.next_frame().unwrap() {
        last_frame = Some(frame);
    }

    let last_frame = last_frame.expect("Recording should contain frames");
    let final_angles = sched.current_angles().unwrap();

    // Whole-degree quantisation in the frames
    assert!((last_frame.angles_deg[0] as f64 - final_angles.base_deg).abs() <= 0.5);
    assert!((last_frame.angles_deg[1] as f64 - final_angles.shoulder_deg).abs() <= 0.5);
    assert!((last_frame.angles_deg[2] as f64 - final_angles.elbow_deg).abs() <= 0.5);

    // ServoId ordering matches the frame layout
    assert_eq!(ServoId::Base.index(), 0);
    assert_eq!(ServoId::Hand.index(), 3);
}

#[test]
fn played_back_frames_drive_the_servos() {
    // Record a short pose sequence, then drive it onto a servo bank one
    // frame at a time, the way the executable's playback path does
    let mut recorder = PoseRecorder::new(MemDevice::default());

    let frames = [
        PoseFrame {
            angles_deg: [90, 60, 50, 90],
            gripper_closed: false,
        },
        PoseFrame {
            angles_deg: [100, 65, 45, 90],
            gripper_closed: true,
        },
    ];

    for frame in frames.iter() {
        recorder.record(frame).unwrap();
    }
    recorder.finish().unwrap();
    recorder.rewind();

    let calib = CalibSet {
        linear: [LinearCal {
            intercept_deg: 0.0,
            slope_deg_per_count: 0.25,
        }; NUM_SERVOS],
        manual_trim_deg: [0.0; NUM_SERVOS],
    };
    let mut bank = SimServoBank::new(calib, [90.0; NUM_SERVOS]);

    for servo in ServoId::all().iter() {
        bank.attach(*servo).unwrap();
    }

    let mut played = 0;
    while let Some(frame) = recorder.next_frame().unwrap() {
        for servo in ServoId::all().iter() {
            bank.write_angle(*servo, frame.angles_deg[servo.index()] as f64)
                .unwrap();
        }
        played += 1;
    }
    assert_eq!(played, frames.len());

    // The bank reads back the final frame within the analog quantisation
    let read = bank.read_angle(ServoId::Base).unwrap();
    assert!((read - 100.0).abs() < 0.5);

    let read = bank.read_angle(ServoId::Elbow).unwrap();
    assert!((read - 45.0).abs() < 0.5);
}
