//! Implementations for the MotionSched state structure

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{MotionPlan, MotionSchedError, Params, SchedMode};
use crate::kinematics;
use crate::traj_plan::MAX_SAMPLES;
use comms_if::eqpt::arm::{ArmDems, CartPos, JointAngles, PolarPos, Reachability, ServoId};
use comms_if::tc::motion::{Easing, MotionCmd};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Motion scheduler module state
#[derive(Default)]
pub struct MotionSched {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) mode: SchedMode,

    /// The joint configuration the arm is currently at, valid only when
    /// `pose_valid` is set.
    pub(crate) cur_angles: JointAngles,

    /// The head position matching `cur_angles`.
    pub(crate) cur_pos: CartPos,

    /// The current hand servo angle.
    pub(crate) hand_deg: f64,

    /// Set once the pose has been seeded from the servos.
    pub(crate) pose_valid: bool,

    /// The plan being executed, `None` when idle.
    pub(crate) plan: Option<MotionPlan>,

    pub(crate) output: ArmDems,

    /// Archives the tracked pose, the output map itself is not
    /// CSV-serialisable.
    arch_pose: Archiver,
}

/// Input data to the motion scheduler.
#[derive(Default)]
pub struct InputData {
    /// The motion command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<MotionCmd>,

    /// Session-elapsed time of this cycle.
    ///
    /// Units: seconds
    pub elapsed_s: f64,
}

/// Status report for MotionSched processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Mode at the end of the cycle.
    pub mode: SchedMode,

    /// Verdict on a motion command received this cycle, `None` if no motion
    /// command was received.
    pub reachability: Option<Reachability>,

    /// A motion command was rejected because a motion is already executing.
    pub busy_rejected: bool,

    /// The plan accepted this cycle fell back to joint-space interpolation.
    pub joint_space_fallback: bool,

    /// A trajectory sample was applied this cycle.
    pub step_applied: bool,

    /// The executing plan finished this cycle.
    pub motion_complete: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl State for MotionSched {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = ArmDems;
    type StatusReport = StatusReport;
    type ProcError = MotionSchedError;

    /// Initialise the MotionSched module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        // Create the arch folder for motion_sched
        let mut arch_path = session.arch_root.clone();
        arch_path.push("motion_sched");
        std::fs::create_dir_all(arch_path).unwrap();

        self.arch_report = Archiver::from_path(session, "motion_sched/status_report.csv").unwrap();
        self.arch_pose = Archiver::from_path(session, "motion_sched/pose.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of the motion scheduler.
    ///
    /// At most one trajectory sample is applied per call, so the caller's
    /// cycle rate bounds the time spent here.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report and output
        self.report = StatusReport::default();
        self.output = ArmDems::default();

        // Handle any new command before stepping, so a stop issued this
        // cycle takes effect this cycle
        if let Some(ref cmd) = input_data.cmd {
            self.handle_cmd(cmd, input_data.elapsed_s)?;
        }

        // Step the executing plan
        self.step(input_data.elapsed_s)?;

        self.report.mode = self.mode;

        Ok((self.output.clone(), self.report))
    }
}

impl Archived for MotionSched {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;
        self.arch_pose.serialise(self.cur_angles)?;

        Ok(())
    }
}

impl MotionSched {
    /// Create a scheduler directly from a parameter set, without archiving.
    ///
    /// Used by tests and benchmarks, the executable initialises through
    /// [`State::init`] instead.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Seed the scheduler's pose from measured joint angles.
    ///
    /// Only permitted while idle, an executing plan's pose tracking must not
    /// be disturbed.
    pub fn set_pose(&mut self, angles: JointAngles, hand_deg: f64) {
        if self.mode == SchedMode::Executing {
            warn!("Pose seed ignored while a motion is executing");
            return;
        }

        self.cur_angles = angles;
        self.cur_pos = kinematics::calc_head_pos(&angles, &self.params.kinematics);
        self.hand_deg = hand_deg;
        self.pose_valid = true;

        debug!(
            "Pose seeded: {:?} -> head at [{:.1}, {:.1}, {:.1}] mm",
            angles, self.cur_pos.x, self.cur_pos.y, self.cur_pos.z
        );
    }

    /// True when the scheduler can accept a new motion command.
    pub fn is_available(&self) -> bool {
        self.mode == SchedMode::Idle
    }

    /// The joint configuration the arm is currently at.
    pub fn current_angles(&self) -> Option<JointAngles> {
        if self.pose_valid {
            Some(self.cur_angles)
        } else {
            None
        }
    }

    /// The head position the arm is currently at.
    pub fn current_pos(&self) -> Option<CartPos> {
        if self.pose_valid {
            Some(self.cur_pos)
        } else {
            None
        }
    }

    /// The hand servo angle the arm is currently at.
    ///
    /// The hand sits outside the kinematic chain so it is reported
    /// separately from the chain joints.
    pub fn current_hand_deg(&self) -> Option<f64> {
        if self.pose_valid {
            Some(self.hand_deg)
        } else {
            None
        }
    }

    /// Handle a newly received motion command.
    fn handle_cmd(&mut self, cmd: &MotionCmd, elapsed_s: f64) -> Result<(), MotionSchedError> {
        match cmd {
            MotionCmd::Stop => {
                // Stop is always accepted, whatever the mode
                if self.plan.is_some() {
                    info!("Motion stopped at {:?}", self.cur_angles);
                }

                self.plan = None;
                self.mode = SchedMode::Idle;
            }

            MotionCmd::MoveTo {
                x_mm,
                y_mm,
                z_mm,
                hand_deg,
                relative,
                speed_mms,
                easing,
                closest_point,
            } => {
                let target = if *relative {
                    if !self.pose_valid {
                        return Err(MotionSchedError::NoPose);
                    }
                    self.cur_pos + CartPos::new(*x_mm, *y_mm, *z_mm)
                } else {
                    CartPos::new(*x_mm, *y_mm, *z_mm)
                };

                self.start_move(
                    target,
                    *hand_deg,
                    *easing,
                    *speed_mms,
                    *closest_point,
                    elapsed_s,
                )?;
            }

            MotionCmd::MovePolar {
                stretch_mm,
                rotation_deg,
                height_mm,
                hand_deg,
                relative,
                speed_mms,
                easing,
                closest_point,
            } => {
                let polar = if *relative {
                    if !self.pose_valid {
                        return Err(MotionSchedError::NoPose);
                    }

                    let cur = PolarPos::from_cart(&self.cur_pos);
                    PolarPos {
                        stretch_mm: cur.stretch_mm + stretch_mm,
                        rotation_deg: cur.rotation_deg + rotation_deg,
                        height_mm: cur.height_mm + height_mm,
                    }
                } else {
                    PolarPos {
                        stretch_mm: *stretch_mm,
                        rotation_deg: *rotation_deg,
                        height_mm: *height_mm,
                    }
                };

                self.start_move(
                    polar.to_cart(),
                    *hand_deg,
                    *easing,
                    *speed_mms,
                    *closest_point,
                    elapsed_s,
                )?;
            }
        }

        Ok(())
    }

    /// Plan and start a motion to the given cartesian target.
    fn start_move(
        &mut self,
        target: CartPos,
        hand_deg: Option<f64>,
        easing: Easing,
        speed_mms: f64,
        closest_point: bool,
        elapsed_s: f64,
    ) -> Result<(), MotionSchedError> {
        // Single-flight: an executing motion must run to completion or be
        // explicitly stopped before a new one is accepted
        if self.mode == SchedMode::Executing {
            warn!("Motion command rejected, a motion is already executing");
            self.report.busy_rejected = true;
            return Ok(());
        }

        if !self.pose_valid {
            return Err(MotionSchedError::NoPose);
        }

        self.mode = SchedMode::PathPlanning;

        // If the target is unreachable and the command allows it, retarget
        // to the closest reachable point along the line back to the current
        // position
        let target = if closest_point
            && kinematics::check_target(&target, &self.params.kinematics)
                != Reachability::InRange
        {
            match self.find_closest(&target) {
                Some(t) => {
                    info!(
                        "Target retargeted to closest reachable point [{:.1}, {:.1}, {:.1}] mm",
                        t.x, t.y, t.z
                    );
                    t
                }
                None => {
                    self.mode = SchedMode::Idle;
                    self.report.reachability = Some(Reachability::OutOfRangeNoSolution);
                    return Ok(());
                }
            }
        } else {
            target
        };

        match MotionPlan::build(
            &self.cur_angles,
            &self.cur_pos,
            &target,
            hand_deg,
            easing,
            speed_mms,
            elapsed_s,
            &self.params,
        ) {
            Ok(plan) => {
                info!(
                    "Motion planned: {} samples at {:.3} s intervals{}",
                    plan.num_samples,
                    plan.step_interval_s,
                    if plan.joint_space {
                        " (joint-space fallback)"
                    } else {
                        ""
                    }
                );

                self.report.reachability = Some(Reachability::InRange);
                self.report.joint_space_fallback = plan.joint_space;

                session::save_with_timestamp("motion_sched/plan.json", plan.summary());

                self.plan = Some(plan);
                self.mode = SchedMode::Executing;
            }
            Err(verdict) => {
                warn!("Motion command rejected: {:?}", verdict);
                self.report.reachability = Some(verdict);
                self.mode = SchedMode::Idle;
            }
        }

        Ok(())
    }

    /// Apply at most one due trajectory sample.
    fn step(&mut self, elapsed_s: f64) -> Result<(), MotionSchedError> {
        let plan = match self.plan {
            Some(ref mut p) => p,
            None => return Ok(()),
        };

        if !plan.sample_due(elapsed_s) {
            return Ok(());
        }

        let hand_due = plan.hand_due();
        let hand_deg = plan.hand_deg;
        let sample = plan.take_next();

        // Planned samples were validated at build time, but revalidate as a
        // final barrier before anything reaches the servos
        match kinematics::validate(&sample, &self.params.kinematics) {
            Reachability::InRange => (),
            verdict => {
                self.plan = None;
                self.mode = SchedMode::Idle;
                return Err(MotionSchedError::StepOutOfRange(verdict));
            }
        }

        self.cur_angles = sample;
        self.cur_pos = kinematics::calc_head_pos(&sample, &self.params.kinematics);

        self.output.pos_deg.insert(ServoId::Base, sample.base_deg);
        self.output
            .pos_deg
            .insert(ServoId::Shoulder, sample.shoulder_deg);
        self.output.pos_deg.insert(ServoId::Elbow, sample.elbow_deg);

        if hand_due {
            if let Some(hand) = hand_deg {
                self.hand_deg = hand;
                self.output.pos_deg.insert(ServoId::Hand, hand);
            }
        }

        self.report.step_applied = true;

        trace!(
            "Sample {}/{} applied: {:?}",
            self.plan.as_ref().map(|p| p.next_sample).unwrap_or(0),
            self.plan.as_ref().map(|p| p.num_samples).unwrap_or(0),
            sample
        );

        if self
            .plan
            .as_ref()
            .map(|p| p.is_complete())
            .unwrap_or(false)
        {
            info!("Motion complete at {:?}", self.cur_angles);
            self.plan = None;
            self.mode = SchedMode::Idle;
            self.report.motion_complete = true;
        }

        Ok(())
    }

    /// Search for the closest reachable point to `target` along the line
    /// back to the current position.
    fn find_closest(&self, target: &CartPos) -> Option<CartPos> {
        for i in 0..=MAX_SAMPLES {
            let t = i as f64 / MAX_SAMPLES as f64;
            let point = *target + (self.cur_pos - *target) * t;

            if kinematics::check_target(&point, &self.params.kinematics)
                == Reachability::InRange
            {
                return Some(point);
            }
        }

        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_sched() -> MotionSched {
        let mut sched = MotionSched::default();
        sched.params = Params {
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
        };

        // Seed from a known-good pose
        let pos = CartPos::new(0.0, 200.0, 100.0);
        let angles = kinematics::calc_joint_angles(&pos, &sched.params.kinematics).unwrap();
        sched.set_pose(angles, 90.0);

        sched
    }

    fn move_to(x: f64, y: f64, z: f64) -> MotionCmd {
        MotionCmd::MoveTo {
            x_mm: x,
            y_mm: y,
            z_mm: z,
            hand_deg: None,
            relative: false,
            speed_mms: 200.0,
            easing: Easing::Linear,
            closest_point: false,
        }
    }

    /// Drive the scheduler until the motion completes, returning the number
    /// of cycles that applied a sample.
    fn run_to_completion(sched: &mut MotionSched, mut elapsed_s: f64) -> usize {
        let mut steps = 0;

        for _ in 0..10_000 {
            elapsed_s += 0.02;
            let (_, report) = sched
                .proc(&InputData {
                    cmd: None,
                    elapsed_s,
                })
                .unwrap();

            if report.step_applied {
                steps += 1;
            }
            if report.motion_complete {
                return steps;
            }
        }

        panic!("Motion did not complete");
    }

    #[test]
    fn test_accept_and_complete() {
        let mut sched = test_sched();

        let (_, report) = sched
            .proc(&InputData {
                cmd: Some(move_to(50.0, 200.0, 120.0)),
                elapsed_s: 0.0,
            })
            .unwrap();

        assert_eq!(report.reachability, Some(Reachability::InRange));
        assert_eq!(report.mode, SchedMode::Executing);

        let steps = run_to_completion(&mut sched, 0.0);

        assert!(steps >= 1);
        assert_eq!(sched.mode, SchedMode::Idle);

        // The tracked pose has converged on the target
        let pos = sched.current_pos().unwrap();
        assert!((pos - CartPos::new(50.0, 200.0, 120.0)).norm() < 0.5);
    }

    #[test]
    fn test_busy_rejection() {
        let mut sched = test_sched();

        sched
            .proc(&InputData {
                cmd: Some(move_to(50.0, 200.0, 120.0)),
                elapsed_s: 0.0,
            })
            .unwrap();

        // A second motion while the first executes must be rejected without
        // disturbing the executing plan
        let (_, report) = sched
            .proc(&InputData {
                cmd: Some(move_to(0.0, 220.0, 100.0)),
                elapsed_s: 0.001,
            })
            .unwrap();

        assert!(report.busy_rejected);
        assert_eq!(report.mode, SchedMode::Executing);
    }

    #[test]
    fn test_stop_mid_motion() {
        let mut sched = test_sched();

        sched
            .proc(&InputData {
                cmd: Some(move_to(50.0, 200.0, 120.0)),
                elapsed_s: 0.0,
            })
            .unwrap();

        // Let a few samples apply
        let mut elapsed_s = 0.0;
        for _ in 0..5 {
            elapsed_s += 0.05;
            sched
                .proc(&InputData {
                    cmd: None,
                    elapsed_s,
                })
                .unwrap();
        }

        let pose_before_stop = sched.current_angles().unwrap();

        let (_, report) = sched
            .proc(&InputData {
                cmd: Some(MotionCmd::Stop),
                elapsed_s: elapsed_s + 0.02,
            })
            .unwrap();

        // Stop leaves the scheduler idle at the last applied sample, ready
        // for a new command
        assert_eq!(report.mode, SchedMode::Idle);
        assert_eq!(sched.current_angles().unwrap(), pose_before_stop);

        let (_, report) = sched
            .proc(&InputData {
                cmd: Some(move_to(0.0, 200.0, 100.0)),
                elapsed_s: elapsed_s + 0.04,
            })
            .unwrap();

        assert_eq!(report.reachability, Some(Reachability::InRange));
    }

    #[test]
    fn test_unreachable_rejected_stays_idle() {
        let mut sched = test_sched();

        let (output, report) = sched
            .proc(&InputData {
                cmd: Some(move_to(0.0, 600.0, 100.0)),
                elapsed_s: 0.0,
            })
            .unwrap();

        assert_eq!(
            report.reachability,
            Some(Reachability::OutOfRangeNoSolution)
        );
        assert_eq!(report.mode, SchedMode::Idle);
        assert!(output.pos_deg.is_empty());
    }

    #[test]
    fn test_closest_point_retarget() {
        let mut sched = test_sched();

        let (_, report) = sched
            .proc(&InputData {
                cmd: Some(MotionCmd::MoveTo {
                    x_mm: 0.0,
                    y_mm: 600.0,
                    z_mm: 100.0,
                    hand_deg: None,
                    relative: false,
                    speed_mms: 200.0,
                    easing: Easing::Linear,
                    closest_point: true,
                }),
                elapsed_s: 0.0,
            })
            .unwrap();

        // With closest_point the unreachable target is accepted, retargeted
        // to the edge of the envelope
        assert_eq!(report.reachability, Some(Reachability::InRange));
        assert_eq!(report.mode, SchedMode::Executing);
    }

    #[test]
    fn test_no_pose_rejected() {
        let mut sched = MotionSched::default();
        sched.params = test_sched().params;

        let result = sched.proc(&InputData {
            cmd: Some(move_to(0.0, 200.0, 100.0)),
            elapsed_s: 0.0,
        });

        assert!(matches!(result, Err(MotionSchedError::NoPose)));
    }

    #[test]
    fn test_hand_applied_once() {
        let mut sched = test_sched();

        sched
            .proc(&InputData {
                cmd: Some(MotionCmd::MoveTo {
                    x_mm: 50.0,
                    y_mm: 200.0,
                    z_mm: 120.0,
                    hand_deg: Some(45.0),
                    relative: false,
                    speed_mms: 200.0,
                    easing: Easing::Linear,
                    closest_point: false,
                }),
                elapsed_s: 0.0,
            })
            .unwrap();

        let mut hand_demands = 0;
        let mut elapsed_s = 0.0;

        for _ in 0..10_000 {
            elapsed_s += 0.02;
            let (output, report) = sched
                .proc(&InputData {
                    cmd: None,
                    elapsed_s,
                })
                .unwrap();

            if output.pos_deg.contains_key(&ServoId::Hand) {
                hand_demands += 1;
            }
            if report.motion_complete {
                break;
            }
        }

        assert_eq!(hand_demands, 1);
        assert_eq!(sched.current_hand_deg(), Some(45.0));
    }
}
