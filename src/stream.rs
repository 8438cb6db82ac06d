//! A bounded sliding window of body-frame increments.
//!
//! [`ResetStream`] is the piece a controller keeps around between sensor
//! callbacks: increments are pushed as they arrive, the oldest fall out of the
//! window, and the resetability of the current window can be queried at any
//! time.

use std::collections::VecDeque;
use std::time::Duration;

use nalgebra::UnitQuaternion;

use crate::{
    error::{Error, Result},
    estimator::{estimate_samples, scaled_twice, ResetReport},
    sequence::RotSample,
    EPSILON,
};

/// Parameters for a [`ResetStream`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResetStreamParameters {
    /// Length of the motion window considered for a reset.
    pub window: Duration,
    /// Expected time between two pushed increments.
    ///
    /// Together with [`Self::window`] this determines the capacity of the
    /// stream, $\lfloor window / sample\_period \rfloor$, but at least one.
    pub sample_period: Duration,
    /// Increments whose axis norm or absolute angle falls below this value are
    /// ignored.
    ///
    /// # Note
    ///
    /// Axes shorter than [`EPSILON`] are always ignored, even if this is set
    /// lower, as they have no direction to normalize.
    pub min_increment: f64,
}

impl Default for ResetStreamParameters {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(200),
            sample_period: Duration::from_millis(5),
            min_increment: EPSILON,
        }
    }
}

/// Sliding window of incremental rotations with resetability estimation.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use so3_reset::{ResetStream, ResetStreamParameters, RotSample};
///
/// let mut stream = ResetStream::new(ResetStreamParameters::default())?;
/// for _ in 0..10 {
///     stream.push(RotSample::new(Vector3::z(), 0.01, 0.005));
/// }
///
/// let report = stream.report();
/// assert_eq!(report.samples, 10);
/// assert!(report.r < 1e-9);
///
/// // the command sequence a controller replays
/// let replay = stream.scaled_twice(report.lambda);
/// assert_eq!(replay.len(), 20);
/// # Ok::<(), so3_reset::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResetStream {
    /// The parameters of the stream.
    parameters: ResetStreamParameters,
    /// Maximum number of increments kept in the window.
    capacity: usize,
    /// The increments in the window, oldest first.
    window: VecDeque<RotSample>,
}

impl ResetStream {
    /// Create an empty stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroSamplePeriod`] if the sample period is zero.
    pub fn new(parameters: ResetStreamParameters) -> Result<Self> {
        if parameters.sample_period.is_zero() {
            return Err(Error::ZeroSamplePeriod {
                window: parameters.window,
            });
        }

        let periods = parameters.window.as_nanos() / parameters.sample_period.as_nanos();
        let capacity = usize::try_from(periods).unwrap_or(usize::MAX).max(1);

        Ok(Self {
            parameters,
            capacity,
            window: VecDeque::with_capacity(capacity),
        })
    }

    /// The parameters this stream was created with.
    #[must_use]
    pub fn parameters(&self) -> &ResetStreamParameters {
        &self.parameters
    }

    /// Maximum number of increments kept in the window.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of increments currently in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns `true` if the window holds no increments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// The increments in the window, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &RotSample> + '_ {
        self.window.iter()
    }

    /// Drop all increments, e.g. after a reset has been executed.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Push a new increment into the window.
    ///
    /// The axis is normalized before it is stored. Returns `false` if the
    /// increment was too small to matter and was ignored.
    pub fn push(&mut self, sample: RotSample) -> bool {
        let norm = sample.axis.norm();
        if norm < self.parameters.min_increment.max(EPSILON)
            || sample.angle.abs() < self.parameters.min_increment
        {
            return false;
        }

        self.window.push_back(RotSample {
            axis: sample.axis / norm,
            ..sample
        });

        if self.window.len() > self.capacity {
            self.window.pop_front();
            tracing::debug!(capacity = self.capacity, "evicted oldest increment");
        }

        true
    }

    /// Estimate the resetability of the current window.
    #[must_use]
    pub fn report(&self) -> ResetReport {
        estimate_samples(self.window.iter().copied())
    }

    /// The reset command sequence for the current window: every increment
    /// scaled by `lambda`, emitted twice in order.
    #[must_use]
    pub fn scaled_twice(&self, lambda: f64) -> Vec<RotSample> {
        let scaled = self.window.iter().map(|sample| sample.scaled(lambda));
        scaled.clone().chain(scaled).collect()
    }

    /// The rotation realized by replaying [`Self::scaled_twice`].
    #[must_use]
    pub fn reset_operator(&self, lambda: f64) -> UnitQuaternion<f64> {
        scaled_twice(self.window.iter().copied(), lambda)
    }
}
