//! Histogram summary: mean, per-bucket table and percentile walk.
//!
//! Everything here is a pure function of the bucket counts, so a summary can
//! be rebuilt and compared without running anything.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Cumulative-distribution target, stored in thousandths of a percent so the
/// threshold check is exact integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentile(u32);

impl Percentile {
    /// One thousandth of a percent per unit
    const SCALE: u32 = 1_000;

    /// Target from thousandths of a percent (`99_900` is p99.9)
    pub const fn from_milli(milli: u32) -> Self {
        Self(milli)
    }

    /// Target as a percentage
    pub fn as_percent(&self) -> f64 {
        f64::from(self.0) / f64::from(Self::SCALE)
    }

    /// Whether `cumulative` out of `total` samples reaches this target
    pub fn is_reached(&self, cumulative: u64, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        u128::from(cumulative) * 100 * u128::from(Self::SCALE)
            >= u128::from(self.0) * u128::from(total)
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_percent(), f)
    }
}

impl Serialize for Percentile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_percent())
    }
}

impl<'de> Deserialize<'de> for Percentile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pct = f64::deserialize(deserializer)?;
        if !(0.0..=100.0).contains(&pct) {
            return Err(serde::de::Error::custom(format!(
                "percentile {pct} outside 0..=100"
            )));
        }
        Ok(Self((pct * f64::from(Self::SCALE)).round() as u32))
    }
}

/// Percentiles reported for every run, in increasing order
pub const PERCENTILE_TARGETS: [Percentile; 8] = [
    Percentile::from_milli(25_000),
    Percentile::from_milli(50_000),
    Percentile::from_milli(75_000),
    Percentile::from_milli(90_000),
    Percentile::from_milli(99_000),
    Percentile::from_milli(99_900),
    Percentile::from_milli(99_990),
    Percentile::from_milli(99_999),
];

/// One non-empty bucket of the detail table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    /// Lower edge of the bucket
    pub latency_ns: u64,
    /// Samples in the bucket
    pub count: u64,
    /// Share of all samples, in percent
    pub percent: f64,
    /// Share of samples at or below this bucket, in percent
    pub cumulative_percent: f64,
}

/// Latency at which a percentile target was first reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentileValue {
    /// Target
    pub percentile: Percentile,
    /// Bucket lower edge; `None` when the samples never reached the target
    pub latency_ns: Option<u64>,
}

/// Summary of a histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Total observation count
    pub samples: u64,
    /// Mean latency; `None` without samples
    pub mean_ns: Option<f64>,
    /// Non-empty buckets in increasing latency order
    pub buckets: Vec<BucketRow>,
    /// One entry per [`PERCENTILE_TARGETS`] element
    pub percentiles: Vec<PercentileValue>,
}

impl HistogramSummary {
    /// Summarize raw bucket counts of width `bin_width_ns`
    pub fn from_counts(bin_width_ns: u64, counts: &[u64]) -> Self {
        let mut samples = 0u64;
        let mut weighted = 0u128;
        for (i, &count) in counts.iter().enumerate() {
            samples += count;
            weighted += i as u128 * u128::from(bin_width_ns) * u128::from(count);
        }

        let mean_ns = (samples > 0).then(|| weighted as f64 / samples as f64);

        let mut percentiles: Vec<PercentileValue> = PERCENTILE_TARGETS
            .iter()
            .map(|&percentile| PercentileValue {
                percentile,
                latency_ns: None,
            })
            .collect();
        let mut next = 0;
        let mut cumulative = 0u64;
        let mut buckets = Vec::new();

        for (i, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let latency_ns = i as u64 * bin_width_ns;
            cumulative += count;

            while next < percentiles.len()
                && percentiles[next].percentile.is_reached(cumulative, samples)
            {
                percentiles[next].latency_ns = Some(latency_ns);
                next += 1;
            }

            buckets.push(BucketRow {
                latency_ns,
                count,
                percent: 100.0 * count as f64 / samples as f64,
                cumulative_percent: 100.0 * cumulative as f64 / samples as f64,
            });
        }

        Self {
            samples,
            mean_ns,
            buckets,
            percentiles,
        }
    }

    /// Latency recorded for one of the standard targets
    pub fn percentile(&self, target: Percentile) -> Option<u64> {
        self.percentiles
            .iter()
            .find(|p| p.percentile == target)
            .and_then(|p| p.latency_ns)
    }
}

impl fmt::Display for HistogramSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Samples:\t{}", self.samples)?;
        match self.mean_ns {
            Some(mean) => writeln!(f, "Average:\t{mean:.1}ns")?,
            None => writeln!(f, "Average:\tn/a")?,
        }

        writeln!(f, "Ns\tCount\tRatio\tPercent")?;
        for row in &self.buckets {
            writeln!(
                f,
                "{}\t{}\t{:.1}%\t{:.3}%",
                row.latency_ns, row.count, row.percent, row.cumulative_percent
            )?;
        }
        writeln!(f)?;

        for p in &self.percentiles {
            match p.latency_ns {
                Some(ns) => writeln!(f, "percentile {:6.3} = {}", p.percentile.as_percent(), ns)?,
                None => writeln!(f, "percentile {:6.3} = -", p.percentile.as_percent())?,
            }
        }
        Ok(())
    }
}
