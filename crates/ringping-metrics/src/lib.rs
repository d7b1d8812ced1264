//! # ringping-metrics
//!
//! Latency accounting for ringping.
//!
//! Features:
//! - Fixed bin-width histogram with lock-free recording
//! - Percentile walk and deterministic text report
//! - Cycle counter calibration
//! - JSON export

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clock;
mod error;
mod export;
mod histogram;
mod summary;

pub use clock::{Calibration, TscClock, NANOS_PER_SEC};
pub use error::{MetricsError, MetricsResult};
pub use export::HistogramSnapshot;
pub use histogram::{Histogram, HistogramConfig, MAX_BINS};
pub use summary::{BucketRow, HistogramSummary, Percentile, PercentileValue, PERCENTILE_TARGETS};
