//! Windowed resetability analysis over recorded orientation telemetry.
//!
//! Telemetry usually records absolute attitudes rather than increments. The
//! increments are recovered from consecutive attitudes with
//! [`relative_rotation`], and a window of them is estimated at every step.

use nalgebra::{Quaternion, UnitQuaternion};

use crate::{
    error::{Error, Result},
    estimator::predict_reset_benefit,
    quaternion::{quat_to_axis_angle, relative_rotation},
    sequence::RotSample,
};

/// One recorded attitude.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrientationSample {
    /// Time of the recording, in seconds.
    pub timestamp: f64,
    /// The recorded attitude. It does not need to be normalized.
    pub orientation: Quaternion<f64>,
}

/// Attach timestamps to attitudes recorded at a fixed rate.
///
/// The rate is clamped to at least 1 Hz.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn samples_from_rate(orientations: &[Quaternion<f64>], rate_hz: f64) -> Vec<OrientationSample> {
    let rate_hz = rate_hz.max(1.0);

    orientations
        .iter()
        .enumerate()
        .map(|(i, orientation)| OrientationSample {
            timestamp: i as f64 / rate_hz,
            orientation: *orientation,
        })
        .collect()
}

/// Resetability metrics of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowResult {
    /// Timestamp of the attitude the window ends at, in seconds.
    pub timestamp: f64,
    /// Uniform angle scale of the window.
    pub lambda: f64,
    /// Residual identity metric of the window.
    pub r: f64,
    /// Net rotation of the window, in degrees.
    pub theta_net_deg: f64,
    /// Predicted benefit of resetting at the end of the window, in degrees.
    pub predicted_benefit_deg: f64,
}

/// Run the resetability estimate over a sliding window of `window` increments.
///
/// One result is produced for every attitude `i` with `window <= i < len - 1`,
/// covering the increments between attitudes `i - window` and `i`. Too short
/// recordings produce no results.
///
/// # Errors
///
/// Returns [`Error::EmptyWindow`] if `window` is zero.
pub fn analyze_orientations(
    samples: &[OrientationSample],
    window: usize,
) -> Result<Vec<WindowResult>> {
    if window == 0 {
        return Err(Error::EmptyWindow);
    }

    let end = samples.len().saturating_sub(1);
    if end <= window {
        tracing::debug!(
            samples = samples.len(),
            window,
            "telemetry too short for analysis"
        );
        return Ok(Vec::new());
    }

    let increments: Vec<RotSample> = samples
        .windows(2)
        .map(|pair| {
            let step = quat_to_axis_angle(&relative_rotation(
                &pair[0].orientation,
                &pair[1].orientation,
            ));
            RotSample::new(step.axis, step.angle, pair[1].timestamp - pair[0].timestamp)
        })
        .collect();

    let results: Vec<WindowResult> = (window..end)
        .map(|i| {
            let current = UnitQuaternion::new_normalize(samples[i].orientation);
            let prediction = predict_reset_benefit(&increments[i - window..i], &current);
            let report = prediction.report;

            if !report.r.is_finite() {
                tracing::warn!(
                    timestamp = samples[i].timestamp,
                    "non-finite resetability, check the telemetry for invalid attitudes"
                );
            }

            WindowResult {
                timestamp: samples[i].timestamp,
                lambda: report.lambda,
                r: report.r,
                theta_net_deg: report.theta_net.to_degrees(),
                predicted_benefit_deg: prediction.benefit.to_degrees(),
            }
        })
        .collect();

    tracing::debug!(windows = results.len(), window, "analyzed orientation telemetry");

    Ok(results)
}

/// Thresholds deciding which windows are worth a reset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateThresholds {
    /// A window qualifies only if its residual metric is below this value.
    pub max_r: f64,
    /// A window qualifies only if its net rotation exceeds this angle, in
    /// degrees.
    pub min_theta_net_deg: f64,
    /// A window qualifies only if its predicted benefit exceeds this angle, in
    /// degrees.
    pub min_benefit_deg: f64,
}

impl Default for CandidateThresholds {
    fn default() -> Self {
        Self {
            max_r: 0.05,
            min_theta_net_deg: 1.0,
            min_benefit_deg: 0.0,
        }
    }
}

impl CandidateThresholds {
    fn is_reset(&self, result: &WindowResult) -> bool {
        result.r < self.max_r && result.predicted_benefit_deg > self.min_benefit_deg
    }

    fn is_candidate(&self, result: &WindowResult) -> bool {
        self.is_reset(result) && result.theta_net_deg > self.min_theta_net_deg
    }
}

/// The windows in which a reset is both possible and worthwhile.
#[must_use]
pub fn reset_candidates(
    results: &[WindowResult],
    thresholds: &CandidateThresholds,
) -> Vec<WindowResult> {
    results
        .iter()
        .filter(|result| thresholds.is_candidate(result))
        .copied()
        .collect()
}

/// Aggregate statistics over an analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisSummary {
    /// Mean residual metric, NaN if there is none.
    pub mean_r: f64,
    /// Population standard deviation of the residual metric, NaN if there is
    /// none.
    pub std_r: f64,
    /// Mean net rotation in degrees, NaN if there is none.
    pub mean_theta_net_deg: f64,
    /// Mean predicted benefit in degrees, NaN if there is none.
    pub mean_benefit_deg: f64,
    /// Number of windows with a residual below [`CandidateThresholds::max_r`]
    /// and a benefit above [`CandidateThresholds::min_benefit_deg`].
    pub resets: usize,
}

/// Summarize an analysis run. NaN entries are left out of the means.
#[must_use]
pub fn summarize(results: &[WindowResult], thresholds: &CandidateThresholds) -> AnalysisSummary {
    AnalysisSummary {
        mean_r: nan_mean(results.iter().map(|result| result.r)),
        std_r: nan_std(results.iter().map(|result| result.r)),
        mean_theta_net_deg: nan_mean(results.iter().map(|result| result.theta_net_deg)),
        mean_benefit_deg: nan_mean(results.iter().map(|result| result.predicted_benefit_deg)),
        resets: results
            .iter()
            .filter(|result| thresholds.is_reset(result))
            .count(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|value| !value.is_nan())
        .fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

fn nan_std(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let mean = nan_mean(values.clone());
    nan_mean(values.map(|value| (value - mean).powi(2))).sqrt()
}
