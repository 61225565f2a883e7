//! # Trajectory planning module
//!
//! Generates the sample sequences followed by the motion scheduler. A path is
//! interpolated axis by axis into a fixed-size sample buffer, with an easing
//! profile shaping the progression along it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::JointAngles;
use comms_if::tc::motion::Easing;
use util::maths::lin_map;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum number of samples in a single trajectory.
pub const MAX_SAMPLES: usize = 60;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Number of samples to use for a motion between two joint configurations.
///
/// One sample per degree of the largest joint excursion, so a linear profile
/// never steps a joint by more than about a degree. Always at least one
/// sample, so a zero-length motion still produces its endpoint, and never
/// more than [`MAX_SAMPLES`].
pub fn num_samples(start: &JointAngles, end: &JointAngles) -> usize {
    let excursion_deg = start.max_excursion_deg(end);

    (excursion_deg.ceil() as usize).max(1).min(MAX_SAMPLES)
}

/// Interpolate a single axis from `start` to `end` into `out`.
///
/// Sample `i` holds the axis value at eased progress `(i + 1) / out.len()`,
/// so the final sample is exactly `end` for every easing profile.
pub fn interp_axis(start: f64, end: f64, easing: Easing, out: &mut [f64]) {
    let count = out.len();

    for (i, sample) in out.iter_mut().enumerate() {
        let t = (i + 1) as f64 / count as f64;
        *sample = lin_map((0.0, 1.0), (start, end), ease(easing, t));
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Eased progress for linear progress `t` in `[0, 1]`.
///
/// Every profile is exact at the endpoints: `ease(0) == 0`, `ease(1) == 1`.
fn ease(easing: Easing, t: f64) -> f64 {
    match easing {
        Easing::Linear => t,
        Easing::EaseIn => t * t,
        Easing::EaseOut => t * (2.0 - t),
        Easing::EaseInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -2.0 * t * t + 4.0 * t - 1.0
            }
        }
        Easing::Smooth => t * t * (3.0 - 2.0 * t),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_EASINGS: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::Smooth,
    ];

    #[test]
    fn test_num_samples() {
        let start = JointAngles::new(0.0, 0.0, 0.0);

        // One sample per degree of the largest excursion
        assert_eq!(num_samples(&start, &JointAngles::new(10.0, 42.4, 5.0)), 43);

        // Zero-length motions still produce one sample
        assert_eq!(num_samples(&start, &start), 1);

        // Large excursions saturate at the buffer size
        assert_eq!(
            num_samples(&start, &JointAngles::new(180.0, 0.0, 0.0)),
            MAX_SAMPLES
        );
    }

    #[test]
    fn test_endpoints_exact() {
        for easing in ALL_EASINGS.iter() {
            let mut out = [0.0; 17];
            interp_axis(10.0, 55.0, *easing, &mut out);

            assert_eq!(
                out[16], 55.0,
                "Final sample not exact for {:?}",
                easing
            );
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL_EASINGS.iter() {
            let mut out = [0.0; 30];
            interp_axis(0.0, 90.0, *easing, &mut out);

            let mut prev = 0.0;
            for sample in out.iter() {
                assert!(
                    *sample >= prev,
                    "Non-monotonic sample for {:?}",
                    easing
                );
                prev = *sample;
            }
        }
    }

    #[test]
    fn test_linear_step_bound() {
        // With one sample per degree a linear profile must never step an
        // axis by more than a degree (plus rounding headroom)
        let start = JointAngles::new(0.0, 0.0, 0.0);
        let end = JointAngles::new(0.0, 47.3, 0.0);

        let count = num_samples(&start, &end);
        let mut out = vec![0.0; count];
        interp_axis(start.shoulder_deg, end.shoulder_deg, Easing::Linear, &mut out);

        let mut prev = start.shoulder_deg;
        for sample in out.iter() {
            assert!((*sample - prev).abs() <= 1.0 + 1e-9);
            prev = *sample;
        }
    }

    #[test]
    fn test_ease_in_out_continuous_at_midpoint() {
        let below = ease(Easing::EaseInOut, 0.5 - 1e-9);
        let above = ease(Easing::EaseInOut, 0.5 + 1e-9);

        assert!((below - above).abs() < 1e-6);
    }
}
