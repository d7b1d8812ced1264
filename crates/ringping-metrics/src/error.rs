//! Error types for latency accounting

use thiserror::Error;

/// Histogram and calibration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Bucket width of zero
    #[error("histogram bin width must be nonzero")]
    ZeroBinWidth,

    /// Ceiling does not cover a single bucket
    #[error("latency ceiling {ceiling_ns}ns is below one bin of {bin_width_ns}ns")]
    CeilingBelowBin {
        /// Configured ceiling
        ceiling_ns: u64,
        /// Configured bucket width
        bin_width_ns: u64,
    },

    /// Geometry needs more buckets than a histogram may hold
    #[error("histogram needs {bins} bins, at most {max} allowed")]
    TooManyBins {
        /// Buckets the geometry asks for
        bins: u64,
        /// Upper limit
        max: u64,
    },

    /// Clock frequency of zero
    #[error("clock frequency must be nonzero")]
    ZeroFrequency,
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
