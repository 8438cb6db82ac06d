//! Resetability estimation.
//!
//! Given a recorded window of incremental rotations with net rotation angle
//! $\theta$, every sample angle is scaled by $\lambda = \pi / \theta$. In the
//! single-axis case the scaled sequence is a half turn, and replaying it twice
//! returns to the identity. For non-commuting motion this only holds
//! approximately, and the residual $R = 1 - |w|$ of the twice-applied sequence
//! measures how well the reset works.

use core::f64::consts::PI;

use nalgebra::UnitQuaternion;

use crate::{
    quaternion::{compose, quat_to_axis_angle, rotation_magnitude},
    sequence::{compose_samples, compose_sequence, RotSample},
    EPSILON,
};

/// The outcome of [`estimate_resetability`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResetReport {
    /// Uniform angle scale $\lambda$ applied to every sample.
    pub lambda: f64,
    /// Residual identity metric of the twice-applied scaled sequence.
    ///
    /// `0` is an exact reset, `1` means the replay leaves a half turn behind.
    pub r: f64,
    /// Angle of the observed net rotation before scaling, in radians.
    pub theta_net: f64,
    /// Number of samples the estimate was computed from.
    pub samples: usize,
}

impl ResetReport {
    /// Whether the observed motion was already (numerically) the identity, so
    /// there is nothing to reset.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.theta_net < EPSILON
    }
}

/// Estimate the resetability of a sequence of incremental rotations.
///
/// This never fails. An empty sequence, or one whose net rotation is within
/// [`EPSILON`] of the identity, reports `lambda = 1`, `theta_net = 0` and
/// `r = 0`. Non-finite inputs propagate as NaN.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use so3_reset::{estimate_resetability, RotSample};
///
/// let report = estimate_resetability(&[RotSample::new(
///     Vector3::x(),
///     std::f64::consts::FRAC_PI_2,
///     0.01,
/// )]);
///
/// assert!((report.lambda - 2.0).abs() < 1e-9);
/// assert!(report.r < 1e-9);
/// ```
#[must_use]
pub fn estimate_resetability(samples: &[RotSample]) -> ResetReport {
    estimate_samples(samples.iter().copied())
}

pub(crate) fn estimate_samples<I>(samples: I) -> ResetReport
where
    I: Iterator<Item = RotSample> + Clone,
{
    let count = samples.clone().count();
    let theta_net = quat_to_axis_angle(&compose_samples(samples.clone())).angle;
    let lambda = if theta_net > EPSILON { PI / theta_net } else { 1.0 };

    let reset = scaled_twice(samples, lambda);
    let r = residual(&reset);

    tracing::trace!(count, theta_net, lambda, r, "estimated resetability");

    ResetReport {
        lambda,
        r,
        theta_net,
        samples: count,
    }
}

/// Compose the samples scaled by `lambda`, followed by the same scaled samples
/// again, into a single rotation.
///
/// This is the operator a controller executes to perform the reset. `lambda`
/// does not need to be the one from [`estimate_resetability`], e.g. it may be
/// clamped to actuator limits first. For the estimated `lambda`, the residual
/// of the returned rotation is exactly [`ResetReport::r`].
#[must_use]
pub fn apply_scaled_twice(samples: &[RotSample], lambda: f64) -> UnitQuaternion<f64> {
    scaled_twice(samples.iter().copied(), lambda)
}

pub(crate) fn scaled_twice<I>(samples: I, lambda: f64) -> UnitQuaternion<f64>
where
    I: Iterator<Item = RotSample> + Clone,
{
    let scaled = samples.map(move |sample| sample.scaled(lambda));
    compose_samples(scaled.clone().chain(scaled))
}

/// Deviation of a rotation from the identity, $1 - |w|$ with $w$ clamped to
/// $[-1, 1]$.
///
/// Both $\pm 1$ represent the identity, so both give `0`.
#[must_use]
pub fn residual(q: &UnitQuaternion<f64>) -> f64 {
    1.0 - q.w.clamp(-1.0, 1.0).abs()
}

/// Predicted effect of performing a reset from a given attitude.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResetBenefit {
    /// Reduction of the residual attitude angle obtained by resetting, in
    /// radians. Negative when the reset makes things worse.
    pub benefit: f64,
    /// Attitude angle after repeating the observed motion once more, in
    /// radians.
    pub residual_without_reset: f64,
    /// Attitude angle after replaying the scaled sequence twice instead, in
    /// radians.
    pub residual_with_reset: f64,
    /// The underlying resetability estimate.
    pub report: ResetReport,
}

/// Predict how much a reset would help, compared to carrying on.
///
/// Starting from `current`, the observed motion is applied once more and,
/// alternatively, the scaled sequence is applied twice with the estimated
/// $\lambda$. The benefit is the difference between the two resulting attitude
/// angles, each measured with [`rotation_magnitude`].
#[must_use]
pub fn predict_reset_benefit(
    samples: &[RotSample],
    current: &UnitQuaternion<f64>,
) -> ResetBenefit {
    let report = estimate_resetability(samples);

    let future = compose(&compose_sequence(samples), current);
    let residual_without_reset = rotation_magnitude(&future);

    let after_reset = compose(&apply_scaled_twice(samples, report.lambda), current);
    let residual_with_reset = rotation_magnitude(&after_reset);

    ResetBenefit {
        benefit: residual_without_reset - residual_with_reset,
        residual_without_reset,
        residual_with_reset,
        report,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{UnitQuaternion, Vector3};

    use super::*;
    use crate::quaternion::axis_angle_to_quat;
    use crate::sequence::scaled_sequence;

    fn sample(axis: Vector3<f64>, angle: f64) -> RotSample {
        RotSample::new(axis, angle, 0.01)
    }

    fn wobble() -> Vec<RotSample> {
        (0..40)
            .map(|i| {
                let t = f64::from(i) * 0.1;
                sample(Vector3::new(t.cos(), t.sin(), 0.3), 0.02 + 0.01 * t.sin())
            })
            .collect()
    }

    #[test]
    fn empty_sequence_is_trivial() {
        let report = estimate_resetability(&[]);

        assert_eq!(
            report,
            ResetReport {
                lambda: 1.0,
                r: 0.0,
                theta_net: 0.0,
                samples: 0,
            }
        );
        assert!(report.is_identity());
    }

    #[test]
    fn single_quarter_turn() {
        let report = estimate_resetability(&[sample(Vector3::x(), FRAC_PI_2)]);

        assert_abs_diff_eq!(report.theta_net, FRAC_PI_2, epsilon = 1e-9);
        assert_abs_diff_eq!(report.lambda, 2.0, epsilon = 1e-9);
        assert!(report.r <= 1e-9);
        assert_eq!(report.samples, 1);
    }

    #[test]
    fn canceling_pair_needs_no_reset() {
        let report = estimate_resetability(&[
            sample(Vector3::y(), FRAC_PI_2),
            sample(Vector3::y(), -FRAC_PI_2),
        ]);

        assert_abs_diff_eq!(report.theta_net, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.lambda, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.r, 0.0, epsilon = 1e-9);
        assert_eq!(report.samples, 2);
    }

    #[test]
    fn half_turn_is_left_unscaled() {
        let report = estimate_resetability(&[sample(Vector3::z(), FRAC_PI_3); 3]);

        assert_abs_diff_eq!(report.theta_net, PI, epsilon = 1e-9);
        assert_abs_diff_eq!(report.lambda, 1.0, epsilon = 1e-9);
        assert!(report.r <= 1e-9);
        assert_eq!(report.samples, 3);
    }

    #[test]
    fn non_commuting_pair_leaves_a_residual() {
        let report = estimate_resetability(&[
            sample(Vector3::x(), FRAC_PI_2),
            sample(Vector3::y(), FRAC_PI_2),
        ]);

        assert_abs_diff_eq!(report.theta_net, 2.0 * PI / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.lambda, 1.5, epsilon = 1e-9);
        assert!(report.r > 0.0 && report.r < 0.5);
        // 1 - |2 cos^4(3π/8) - 1|
        assert_abs_diff_eq!(report.r, 0.042_893_218_813_452_4, epsilon = 1e-9);
    }

    #[test]
    fn non_unit_axis_matches_unit_axis() {
        let scaled = estimate_resetability(&[sample(Vector3::new(2.0, 0.0, 0.0), PI)]);
        let unit = estimate_resetability(&[sample(Vector3::x(), PI)]);

        assert_abs_diff_eq!(scaled.theta_net, PI, epsilon = 1e-9);
        assert_abs_diff_eq!(scaled.lambda, 1.0, epsilon = 1e-9);
        assert!(scaled.r <= 1e-9);
        assert_abs_diff_eq!(scaled.theta_net, unit.theta_net, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.r, unit.r, epsilon = 1e-12);
    }

    #[test]
    fn single_axis_motion_resets_exactly() {
        for angles in [[0.2, 0.3, 0.4], [-0.4, -0.4, 0.1], [1.0, 2.0, 1.5]] {
            let samples: Vec<_> = angles
                .iter()
                .map(|&angle| sample(Vector3::new(1.0, 2.0, 3.0), angle))
                .collect();
            let report = estimate_resetability(&samples);

            let total: f64 = angles.iter().sum();
            let expected = total.abs() % (2.0 * PI);
            assert_abs_diff_eq!(report.theta_net, expected, epsilon = 1e-9);
            assert_abs_diff_eq!(report.lambda, PI / expected, epsilon = 1e-9);
            assert!(report.r <= 1e-9, "r = {}", report.r);
        }
    }

    #[test]
    fn estimate_stays_in_bounds() {
        let samples = wobble();
        let report = estimate_resetability(&samples);

        assert!((0.0..=2.0).contains(&report.r));
        assert!(report.lambda >= 0.0);
        assert!((0.0..=2.0 * PI).contains(&report.theta_net));
        assert_eq!(report.samples, samples.len());
    }

    #[test]
    fn applier_reproduces_reported_residual() {
        let samples = wobble();
        let report = estimate_resetability(&samples);
        let reset = apply_scaled_twice(&samples, report.lambda);

        assert_abs_diff_eq!(residual(&reset), report.r, epsilon = 1e-12);
    }

    #[test]
    fn applier_matches_squared_half() {
        let samples = wobble();
        let half = compose_sequence(&scaled_sequence(&samples, 1.7));
        let reset = apply_scaled_twice(&samples, 1.7);

        assert_abs_diff_eq!(reset, half * half, epsilon = 1e-12);
        assert_relative_eq!(reset.quaternion().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn residual_treats_both_identities_alike() {
        let full_turn = axis_angle_to_quat(&Vector3::z(), 2.0 * PI);

        assert_abs_diff_eq!(residual(&UnitQuaternion::identity()), 0.0);
        assert_abs_diff_eq!(residual(&full_turn), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            residual(&axis_angle_to_quat(&Vector3::x(), PI)),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn nan_input_propagates() {
        let report = estimate_resetability(&[sample(Vector3::x(), f64::NAN)]);
        assert!(report.r.is_nan());
        assert_eq!(report.samples, 1);
    }

    #[test]
    fn reset_beats_carrying_on_for_single_axis_motion() {
        let samples = [sample(Vector3::z(), 0.1); 5];
        let current = axis_angle_to_quat(&Vector3::z(), 0.2);
        let prediction = predict_reset_benefit(&samples, &current);

        // carrying on ends at 0.7 rad, the reset goes through a full turn and
        // leaves the current 0.2 rad (as -q)
        assert_abs_diff_eq!(prediction.residual_without_reset, 0.7, epsilon = 1e-9);
        assert_abs_diff_eq!(prediction.residual_with_reset, 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(prediction.benefit, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(prediction.report.lambda, 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn empty_sequence_has_no_benefit() {
        let current = axis_angle_to_quat(&Vector3::y(), 0.3);
        let prediction = predict_reset_benefit(&[], &current);

        assert_abs_diff_eq!(prediction.benefit, 0.0);
        assert_abs_diff_eq!(prediction.residual_without_reset, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(prediction.residual_with_reset, 0.3, epsilon = 1e-12);
        assert_eq!(prediction.report.samples, 0);
    }
}
