//! Fixed bin-width histogram for round-trip latency

use crate::clock::Calibration;
use crate::error::{MetricsError, MetricsResult};
use crate::summary::HistogramSummary;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Most buckets a histogram may allocate
pub const MAX_BINS: u64 = 1 << 24;

/// Histogram geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Width of one bucket in nanoseconds
    pub bin_width_ns: u64,
    /// Latency ceiling; anything at or above it lands in the last bucket
    pub max_latency_ns: u64,
}

impl HistogramConfig {
    /// Number of buckets this geometry produces
    pub fn bins(&self) -> usize {
        usize::try_from(self.bin_count()).unwrap_or(usize::MAX)
    }

    fn bin_count(&self) -> u64 {
        self.max_latency_ns
            .checked_div(self.bin_width_ns)
            .unwrap_or(0)
    }

    /// Reject geometries with no usable bucket or too many to allocate
    pub fn validate(&self) -> MetricsResult<()> {
        if self.bin_width_ns == 0 {
            return Err(MetricsError::ZeroBinWidth);
        }
        if self.max_latency_ns < self.bin_width_ns {
            return Err(MetricsError::CeilingBelowBin {
                ceiling_ns: self.max_latency_ns,
                bin_width_ns: self.bin_width_ns,
            });
        }
        let bins = self.bin_count();
        if bins > MAX_BINS {
            return Err(MetricsError::TooManyBins {
                bins,
                max: MAX_BINS,
            });
        }
        Ok(())
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bin_width_ns: 100,
            max_latency_ns: 10_000_000, // 10 ms
        }
    }
}

/// Latency histogram shared by every pinger.
///
/// Recording is a single relaxed `fetch_add` on one bucket; no locks.
pub struct Histogram {
    config: HistogramConfig,
    /// Counts per bucket
    counts: Box<[AtomicU64]>,
}

impl Histogram {
    /// Create histogram with the default geometry (100 ns buckets up to 10 ms)
    pub fn new() -> Self {
        let config = HistogramConfig::default();
        Self::build(config)
    }

    /// Create histogram with custom geometry
    pub fn with_config(config: HistogramConfig) -> MetricsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HistogramConfig) -> Self {
        let counts = (0..config.bins()).map(|_| AtomicU64::new(0)).collect();
        Histogram { config, counts }
    }

    /// Bucket a latency falls into, clamped to the last bucket
    #[inline]
    pub fn bucket_index(&self, latency_ns: u64) -> usize {
        let bin = latency_ns / self.config.bin_width_ns;
        let last = self.counts.len() - 1;
        usize::try_from(bin).map_or(last, |bin| bin.min(last))
    }

    /// Record one latency sample
    #[inline]
    pub fn record(&self, latency_ns: u64) {
        let bin = self.bucket_index(latency_ns);
        self.counts[bin].fetch_add(1, Ordering::Relaxed);
    }

    /// Record a raw cycle delta
    #[inline]
    pub fn record_cycles(&self, cycles: u64, calibration: &Calibration) {
        self.record(calibration.cycles_to_nanos(cycles));
    }

    /// Geometry of this histogram
    pub fn config(&self) -> HistogramConfig {
        self.config
    }

    /// Number of buckets
    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Count in a single bucket
    pub fn count(&self, bin: usize) -> u64 {
        self.counts
            .get(bin)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Get total count
    pub fn total_count(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Copy of every bucket count
    pub fn counts(&self) -> Vec<u64> {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .collect()
    }

    /// Zero every bucket
    pub fn reset(&self) {
        for c in self.counts.iter() {
            c.store(0, Ordering::Relaxed);
        }
    }

    /// Build the report from the current bucket counts.
    ///
    /// Meant to be called once recording has stopped.
    pub fn summarize(&self) -> HistogramSummary {
        HistogramSummary::from_counts(self.config.bin_width_ns, &self.counts())
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("config", &self.config)
            .field("total", &self.total_count())
            .finish()
    }
}
