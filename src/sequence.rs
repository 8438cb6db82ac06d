//! Incremental rotation samples and their composition into a net rotation.

use nalgebra::{UnitQuaternion, Vector3};

use crate::quaternion::{axis_angle_to_quat, compose};

/// One incremental rotation, measured in the body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RotSample {
    /// Rotation axis. Normalized internally, so it does not need to be of unit
    /// length. A zero axis is only meaningful together with a zero angle.
    pub axis: Vector3<f64>,
    /// Signed rotation angle around [`Self::axis`], in radians.
    pub angle: f64,
    /// Duration associated with the sample, in seconds.
    ///
    /// # Note
    ///
    /// This is carried through scaling untouched, so that a controller can pace
    /// the replay. None of the estimates in this crate read it.
    pub dt: f64,
}

impl RotSample {
    /// Create a new sample.
    #[must_use]
    pub fn new(axis: Vector3<f64>, angle: f64, dt: f64) -> Self {
        Self { axis, angle, dt }
    }

    /// The same sample with its angle multiplied by `lambda`.
    #[must_use]
    pub fn scaled(&self, lambda: f64) -> Self {
        Self {
            angle: lambda * self.angle,
            ..*self
        }
    }

    /// The rotation of this sample as a unit quaternion.
    #[must_use]
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        axis_angle_to_quat(&self.axis, self.angle)
    }
}

/// Compose an ordered sequence of samples into its net rotation.
///
/// Starting from the identity, every sample is multiplied on the left of the
/// accumulator, so the first sample is applied first. An empty sequence yields
/// the identity.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use so3_reset::sequence::{compose_sequence, RotSample};
///
/// let step = RotSample::new(Vector3::z(), std::f64::consts::FRAC_PI_3, 0.01);
/// let q = compose_sequence(&[step; 3]);
///
/// // three 60° steps make a half turn
/// assert!(q.w.abs() < 1e-12);
/// ```
#[must_use]
pub fn compose_sequence(samples: &[RotSample]) -> UnitQuaternion<f64> {
    compose_samples(samples.iter().copied())
}

/// Left-fold any stream of samples. Shared by the estimator and the applier, so
/// that both evaluate exactly the same product.
pub(crate) fn compose_samples<I>(samples: I) -> UnitQuaternion<f64>
where
    I: IntoIterator<Item = RotSample>,
{
    let net = samples
        .into_iter()
        .fold(UnitQuaternion::identity(), |acc, sample| {
            compose(&sample.to_quaternion(), &acc)
        });

    UnitQuaternion::new_normalize(net.into_inner())
}

/// Scale the angle of every sample by `lambda`, preserving order, axes and
/// `dt`.
#[must_use]
pub fn scaled_sequence(samples: &[RotSample], lambda: f64) -> Vec<RotSample> {
    samples.iter().map(|sample| sample.scaled(lambda)).collect()
}

/// The replay that performs a reset: the scaled samples, followed by the same
/// scaled samples again.
///
/// Composing the result with [`compose_sequence`] gives the same rotation as
/// [`crate::estimator::apply_scaled_twice`].
#[must_use]
pub fn scaled_twice_sequence(samples: &[RotSample], lambda: f64) -> Vec<RotSample> {
    let mut replay = Vec::with_capacity(2 * samples.len());
    replay.extend(samples.iter().map(|sample| sample.scaled(lambda)));
    replay.extend(samples.iter().map(|sample| sample.scaled(lambda)));
    replay
}
