//! Error types for the configuration entry points.
//!
//! The numerical kernel itself is total and never returns an error.

use std::time::Duration;

/// Errors raised when a stream or an analysis is configured with values it
/// cannot work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The sample period of a [`crate::stream::ResetStream`] was zero, so no
    /// window capacity can be derived from it.
    #[error("sample period must be non-zero (window: {window:?})")]
    ZeroSamplePeriod {
        /// The requested window length.
        window: Duration,
    },
    /// A telemetry analysis was requested with a window of zero samples.
    #[error("analysis window must contain at least one increment")]
    EmptyWindow,
}

/// Result type of the fallible entry points in this crate.
pub type Result<T> = core::result::Result<T, Error>;
