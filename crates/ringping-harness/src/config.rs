//! Run configuration

use crate::error::{HarnessError, HarnessResult};
use ringping_metrics::HistogramConfig;
use std::time::Duration;

/// Ring sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Slots in the shared echo ring
    pub echo_capacity: usize,
    /// Slots in each pinger's reply ring
    pub reply_capacity: usize,
    /// Most requests the dispatcher drains per iteration
    pub burst: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            echo_capacity: 128,
            reply_capacity: 2,
            burst: 64,
        }
    }
}

/// Run configuration, read-only once the run starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Pause between a pinger's round trips
    pub delay: Duration,
    /// Total run length
    pub duration: Duration,
    /// Pinger count; defaults to one per spare execution unit
    pub pingers: Option<usize>,
    /// Pin every thread to its execution unit
    pub pin_cores: bool,
    /// Ring sizing
    pub ring: RingConfig,
    /// Histogram geometry
    pub histogram: HistogramConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_micros(1),
            duration: Duration::from_secs(120),
            pingers: None,
            pin_cores: false,
            ring: RingConfig::default(),
            histogram: HistogramConfig::default(),
        }
    }
}

impl RunConfig {
    /// Check the configuration against the number of pingers that will run
    pub fn validate(&self, pingers: usize) -> HarnessResult<()> {
        self.histogram.validate()?;

        if pingers == 0 {
            return Err(HarnessError::InvalidConfig(
                "at least one pinger is required".to_string(),
            ));
        }
        if self.ring.burst == 0 {
            return Err(HarnessError::InvalidConfig(
                "echo burst must be nonzero".to_string(),
            ));
        }
        // one request in flight per pinger must always fit
        if self.ring.echo_capacity < pingers {
            return Err(HarnessError::InvalidConfig(format!(
                "echo capacity {} cannot hold one request per pinger ({})",
                self.ring.echo_capacity, pingers
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.delay, Duration::from_micros(1));
        assert_eq!(config.duration, Duration::from_secs(120));
        assert_eq!(config.ring.echo_capacity, 128);
        assert_eq!(config.ring.reply_capacity, 2);
        assert_eq!(config.ring.burst, 64);
        assert_eq!(config.histogram.bins(), 100_000);
        assert!(config.validate(3).is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let config = RunConfig::default();
        assert!(matches!(config.validate(0), Err(HarnessError::InvalidConfig(_))));
        assert!(matches!(config.validate(129), Err(HarnessError::InvalidConfig(_))));

        let mut config = RunConfig::default();
        config.ring.burst = 0;
        assert!(matches!(config.validate(1), Err(HarnessError::InvalidConfig(_))));

        let mut config = RunConfig::default();
        config.histogram.bin_width_ns = 0;
        assert!(matches!(config.validate(1), Err(HarnessError::Histogram(_))));
    }
}
