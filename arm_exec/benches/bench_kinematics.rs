//! # Kinematics Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use arm_lib::{kinematics, motion_sched};
use comms_if::eqpt::arm::{CartPos, JointAngles};
use comms_if::tc::motion::Easing;

fn bench_params() -> motion_sched::Params {
    motion_sched::Params {
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

fn kinematics_benchmark(c: &mut Criterion) {
    let params = bench_params();
    let kin = &params.kinematics;

    let target = CartPos::new(50.0, 200.0, 150.0);
    let angles = JointAngles::new(90.0, 60.0, 50.0);

    c.bench_function("kinematics::calc_joint_angles", |b| {
        b.iter(|| kinematics::calc_joint_angles(&target, kin))
    });

    c.bench_function("kinematics::calc_head_pos", |b| {
        b.iter(|| kinematics::calc_head_pos(&angles, kin))
    });

    // Full plan build, the worst-case per-cycle cost of accepting a motion
    // command
    let start_pos = kinematics::calc_head_pos(&angles, kin);

    c.bench_function("MotionPlan::build", |b| {
        b.iter(|| {
            motion_sched::MotionPlan::build(
                &angles,
                &start_pos,
                &target,
                None,
                Easing::Smooth,
                200.0,
                0.0,
                &params,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
