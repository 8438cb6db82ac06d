//! Quaternion primitives over axis–angle rotations.
//!
//! All quaternions are stored scalar first, $(w, x, y, z)$, and every function
//! that produces a quaternion renormalizes its output. Composition follows the
//! left-multiply convention: when folding a sequence, the newer rotation is
//! multiplied on the *left* of the running product.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::EPSILON;

/// A rotation expressed as a unit axis and an angle in radians.
///
/// Angles produced by [`quat_to_axis_angle`] lie in $[0, 2\pi]$. The axis is
/// not flipped to reduce the range to $[0, \pi]$.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisAngle {
    /// The rotation axis, unit length up to floating-point error.
    ///
    /// # Note
    ///
    /// At identity the axis is undefined, and the canonical x-basis vector is
    /// returned instead. Callers must not depend on it when `angle == 0`.
    pub axis: Vector3<f64>,
    /// The rotation angle in radians.
    pub angle: f64,
}

impl AxisAngle {
    /// The identity rotation, with the canonical fallback axis.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            axis: Vector3::x(),
            angle: 0.0,
        }
    }
}

/// Build a unit quaternion from an axis and an angle in radians.
///
/// The axis does not need to be normalized. An axis with a norm below
/// [`EPSILON`] yields the identity, regardless of the angle.
///
/// $$q = \left(\cos\frac{\theta}{2}, \sin\frac{\theta}{2}\hat{n}\right)$$
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use so3_reset::quaternion::axis_angle_to_quat;
///
/// let q = axis_angle_to_quat(&Vector3::new(0.0, 0.0, 2.0), std::f64::consts::PI);
/// assert!(q.w.abs() < 1e-12);
/// assert!((q.k - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn axis_angle_to_quat(axis: &Vector3<f64>, angle: f64) -> UnitQuaternion<f64> {
    let norm = axis.norm();
    if norm < EPSILON {
        return UnitQuaternion::identity();
    }

    let axis = axis / norm;
    let (sine, cosine) = (angle / 2.0).sin_cos();

    UnitQuaternion::new_normalize(Quaternion::new(
        cosine,
        sine * axis.x,
        sine * axis.y,
        sine * axis.z,
    ))
}

/// Decompose a quaternion into an [`AxisAngle`].
///
/// The input is renormalized first, so it does not need to be of unit length.
/// The scalar part is clamped to $[-1, 1]$ before taking $\theta = 2 \arccos w$,
/// which places the angle in $[0, 2\pi]$.
///
/// Below [`EPSILON`] the rotation is treated as the identity and
/// [`AxisAngle::identity`] is returned.
#[must_use]
pub fn quat_to_axis_angle(q: &Quaternion<f64>) -> AxisAngle {
    let q = UnitQuaternion::new_normalize(*q);
    let w = q.w.clamp(-1.0, 1.0);
    let angle = 2.0 * w.acos();

    if angle < EPSILON {
        return AxisAngle::identity();
    }

    // floored, the clamp above can leave a zero radicand
    let half_sine = (1.0 - w * w).max(EPSILON).sqrt();

    AxisAngle {
        axis: q.imag() / half_sine,
        angle,
    }
}

/// Magnitude of the shortest rotation represented by `q`, in $[0, \pi]$.
///
/// Unlike [`quat_to_axis_angle`], $q$ and $-q$ give the same value, which makes
/// this the right measure for how far an attitude is from the identity.
#[must_use]
pub fn rotation_magnitude(q: &Quaternion<f64>) -> f64 {
    let q = UnitQuaternion::new_normalize(*q);
    2.0 * q.w.abs().min(1.0).acos()
}

/// Hamilton product $q_a q_b$, renormalized.
///
/// With the left-multiply convention `compose(later, earlier)` applies
/// `earlier` first.
#[must_use]
pub fn compose(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(a.quaternion() * b.quaternion())
}

/// The rotation that carries `from` onto `to`, $q_{to} q_{from}^*$.
///
/// Both inputs are renormalized, so raw telemetry quaternions can be passed in
/// directly.
#[must_use]
pub fn relative_rotation(from: &Quaternion<f64>, to: &Quaternion<f64>) -> UnitQuaternion<f64> {
    let from = UnitQuaternion::new_normalize(*from);
    let to = UnitQuaternion::new_normalize(*to);

    compose(&to, &from.conjugate())
}
