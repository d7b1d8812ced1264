//! Run configuration built from the command line

use crate::cli::Cli;
use ringping_harness::{RingConfig, RunConfig};
use ringping_metrics::HistogramConfig;
use std::time::Duration;

impl Cli {
    /// Run configuration described by these arguments
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            delay: Duration::from_micros(self.delay_us),
            duration: Duration::from_secs(self.duration_secs),
            pingers: self.pingers,
            pin_cores: self.pin,
            ring: RingConfig {
                echo_capacity: self.echo_capacity,
                reply_capacity: self.reply_capacity,
                burst: self.burst,
            },
            histogram: HistogramConfig {
                bin_width_ns: self.bin_width_ns,
                max_latency_ns: self.max_latency_us.saturating_mul(1_000),
            },
        }
    }
}
