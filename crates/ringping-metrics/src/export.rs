//! Histogram export and snapshot functionality

use crate::{Histogram, HistogramConfig, HistogramSummary};
use serde::{Deserialize, Serialize};

/// Snapshot of a histogram and its summary at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSnapshot {
    /// Geometry the samples were bucketed with
    pub config: HistogramConfig,
    /// Summary of the bucket counts
    pub summary: HistogramSummary,
}

impl HistogramSnapshot {
    /// Create a snapshot from a Histogram instance
    pub fn from_histogram(histogram: &Histogram) -> Self {
        Self {
            config: histogram.config(),
            summary: histogram.summarize(),
        }
    }

    /// Export snapshot as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export snapshot as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
