//! Resetability estimation for sequences of incremental 3D rotations.
//!
//! A recorded window of small body-frame rotations accumulates into some net
//! rotation of angle $\theta$. Scaling every sample angle by
//! $\lambda = \pi / \theta$ turns that window into (approximately) a half turn,
//! and replaying the scaled window twice drives the orientation back to the
//! identity. The residual $R = 1 - |w|$ of the twice-applied replay measures
//! how well this works: it is exactly zero for single-axis motion, and grows
//! with the non-commutativity of the recorded rotations.
//!
//! The numerical kernel consists of pure functions:
//!
//! - [`quaternion`]: axis–angle conversion and composition.
//! - [`sequence`]: [`RotSample`] and the left-fold into a net rotation.
//! - [`estimator`]: [`estimate_resetability`] and [`apply_scaled_twice`].
//!
//! On top of it, [`stream`] keeps a bounded sliding window for controllers, and
//! [`analysis`] runs the estimate over recorded orientation telemetry.

pub mod analysis;
mod error;
pub mod estimator;
pub mod quaternion;
pub mod sequence;
pub mod stream;

pub use error::{Error, Result};
pub use estimator::{
    apply_scaled_twice, estimate_resetability, predict_reset_benefit, ResetBenefit, ResetReport,
};
pub use quaternion::{axis_angle_to_quat, compose, quat_to_axis_angle, AxisAngle};
pub use sequence::{compose_sequence, RotSample};
pub use stream::{ResetStream, ResetStreamParameters};

/// Tolerance below which axes are treated as zero and rotations as the
/// identity.
pub const EPSILON: f64 = 1e-12;
