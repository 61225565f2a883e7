//! Motion plan construction and stepping

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// Internal
use super::Params;
use crate::kinematics;
use crate::traj_plan::{self, MAX_SAMPLES};
use comms_if::eqpt::arm::{CartPos, JointAngles, Reachability};
use comms_if::tc::motion::Easing;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A fully planned motion ready for execution.
///
/// Plans are immutable once built, execution only advances `next_sample`.
/// Every sample was validated against the mechanical envelope during
/// planning.
#[derive(Debug, Clone)]
pub struct MotionPlan {
    /// The joint configurations to step through, valid up to `num_samples`.
    samples: [JointAngles; MAX_SAMPLES],

    /// Number of valid samples in `samples`.
    pub num_samples: usize,

    /// Index of the next sample to apply.
    pub next_sample: usize,

    /// Time between consecutive samples.
    ///
    /// Units: seconds
    pub step_interval_s: f64,

    /// Session-elapsed time at which the plan started executing.
    ///
    /// Units: seconds
    pub start_time_s: f64,

    /// Hand servo angle to apply part-way through the motion, if any.
    pub hand_deg: Option<f64>,

    /// True if the plan fell back to joint-space interpolation because the
    /// straight-line path left the reachable envelope.
    pub joint_space: bool,

    /// The cartesian position the plan finishes at.
    pub target_pos: CartPos,
}

/// Summary of a built plan, saved into the session for offline analysis.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlanSummary {
    pub num_samples: usize,
    pub step_interval_s: f64,
    pub start_time_s: f64,
    pub joint_space: bool,
    pub target_pos: CartPos,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionPlan {
    /// Build a plan moving the head from its current pose to `target_pos`.
    ///
    /// The path is planned in cartesian space first, each interpolated point
    /// solved back into joint angles. If any point along the straight line is
    /// unreachable the plan falls back to interpolating in joint space
    /// between the start and target configurations. A fallback sample
    /// violating a joint limit rejects the whole command, nothing is
    /// executed partially.
    ///
    /// On rejection the offending [`Reachability`] verdict is returned.
    pub fn build(
        start_angles: &JointAngles,
        start_pos: &CartPos,
        target_pos: &CartPos,
        hand_deg: Option<f64>,
        easing: Easing,
        speed_mms: f64,
        start_time_s: f64,
        params: &Params,
    ) -> Result<Self, Reachability> {
        let kin = &params.kinematics;

        // The target itself must be reachable before any path is considered
        let target_angles = match kinematics::calc_joint_angles(target_pos, kin) {
            Some(a) => a,
            None => return Err(Reachability::OutOfRangeNoSolution),
        };

        match kinematics::validate(&target_angles, kin) {
            Reachability::InRange => (),
            verdict => return Err(verdict),
        }

        let count = traj_plan::num_samples(start_angles, &target_angles);
        let mut samples = [JointAngles::default(); MAX_SAMPLES];

        // Cartesian plan: interpolate the straight line to the target and
        // solve each point back into joint space
        let mut x = [0.0; MAX_SAMPLES];
        let mut y = [0.0; MAX_SAMPLES];
        let mut z = [0.0; MAX_SAMPLES];

        traj_plan::interp_axis(start_pos.x, target_pos.x, easing, &mut x[..count]);
        traj_plan::interp_axis(start_pos.y, target_pos.y, easing, &mut y[..count]);
        traj_plan::interp_axis(start_pos.z, target_pos.z, easing, &mut z[..count]);

        let mut joint_space = false;

        for i in 0..count {
            let point = CartPos::new(x[i], y[i], z[i]);

            match kinematics::calc_joint_angles(&point, kin) {
                Some(a) if kinematics::validate(&a, kin) == Reachability::InRange => {
                    samples[i] = a
                }
                _ => {
                    joint_space = true;
                    break;
                }
            }
        }

        // Joint-space fallback: interpolate each joint directly. Both
        // endpoints are valid but an eased path could still close the
        // coupled angle too far, in which case the command is rejected.
        if joint_space {
            let mut base = [0.0; MAX_SAMPLES];
            let mut shoulder = [0.0; MAX_SAMPLES];
            let mut elbow = [0.0; MAX_SAMPLES];

            traj_plan::interp_axis(
                start_angles.base_deg,
                target_angles.base_deg,
                easing,
                &mut base[..count],
            );
            traj_plan::interp_axis(
                start_angles.shoulder_deg,
                target_angles.shoulder_deg,
                easing,
                &mut shoulder[..count],
            );
            traj_plan::interp_axis(
                start_angles.elbow_deg,
                target_angles.elbow_deg,
                easing,
                &mut elbow[..count],
            );

            for i in 0..count {
                let angles = JointAngles::new(base[i], shoulder[i], elbow[i]);

                match kinematics::validate(&angles, kin) {
                    Reachability::InRange => samples[i] = angles,
                    verdict => return Err(verdict),
                }
            }
        }

        // The final sample is pinned to the exact target solution so the
        // motion always finishes at the commanded configuration
        samples[count - 1] = target_angles;

        // Clamp the demanded speed to the arm's capability and derive the
        // per-sample schedule from the straight-line path length
        let speed_mms =
            util::maths::clamp(&speed_mms, &params.min_speed_mms, &params.max_speed_mms);
        let distance_mm = (*target_pos - *start_pos).norm();

        Ok(MotionPlan {
            samples,
            num_samples: count,
            next_sample: 0,
            step_interval_s: distance_mm / speed_mms / count as f64,
            start_time_s,
            hand_deg,
            joint_space,
            target_pos: *target_pos,
        })
    }

    /// Summary of this plan for saving into the session.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            num_samples: self.num_samples,
            step_interval_s: self.step_interval_s,
            start_time_s: self.start_time_s,
            joint_space: self.joint_space,
            target_pos: self.target_pos,
        }
    }

    /// True if the next sample's scheduled time has passed.
    pub fn sample_due(&self, elapsed_s: f64) -> bool {
        !self.is_complete()
            && elapsed_s - self.start_time_s
                >= (self.next_sample + 1) as f64 * self.step_interval_s
    }

    /// True if the hand servo demand should be issued with the next sample.
    ///
    /// The hand is applied once, a quarter of the way through the motion.
    pub fn hand_due(&self) -> bool {
        self.hand_deg.is_some() && self.next_sample == self.num_samples / 4
    }

    /// Advance the plan by one sample, returning it.
    pub fn take_next(&mut self) -> JointAngles {
        let sample = self.samples[self.next_sample];
        self.next_sample += 1;
        sample
    }

    /// True once every sample has been applied.
    pub fn is_complete(&self) -> bool {
        self.next_sample >= self.num_samples
    }
}
