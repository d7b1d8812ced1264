//! Cycle counter and its calibration

use crate::error::{MetricsError, MetricsResult};
use serde::{Deserialize, Serialize};

/// Nanoseconds in one second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Raw cycles used to derive the counter frequency
const PROBE_CYCLES: u64 = 1_000_000_000;

/// Counter frequency used to turn cycle deltas into nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    hz: u64,
}

impl Calibration {
    /// Calibration for a counter ticking `hz` times per second
    pub fn from_hz(hz: u64) -> MetricsResult<Self> {
        if hz == 0 {
            return Err(MetricsError::ZeroFrequency);
        }
        Ok(Self { hz })
    }

    /// A counter that already ticks in nanoseconds
    pub fn nanos() -> Self {
        Self { hz: NANOS_PER_SEC }
    }

    /// Ticks per second
    pub fn hz(&self) -> u64 {
        self.hz
    }

    /// Convert a cycle delta to nanoseconds, saturating at `u64::MAX`
    pub fn cycles_to_nanos(&self, cycles: u64) -> u64 {
        let ns = u128::from(cycles) * u128::from(NANOS_PER_SEC) / u128::from(self.hz);
        u64::try_from(ns).unwrap_or(u64::MAX)
    }
}

/// Monotonic cycle counter backed by `quanta`.
///
/// Reads the TSC where available and falls back to the OS monotonic clock.
#[derive(Clone)]
pub struct TscClock {
    clock: quanta::Clock,
    calibration: Calibration,
}

impl TscClock {
    /// Create the clock and capture its calibration
    pub fn new() -> Self {
        let clock = quanta::Clock::new();
        let probe_ns = clock.delta(0, PROBE_CYCLES).as_nanos();
        let hz = if probe_ns == 0 {
            NANOS_PER_SEC
        } else {
            let hz = u128::from(PROBE_CYCLES) * u128::from(NANOS_PER_SEC) / probe_ns;
            u64::try_from(hz).unwrap_or(u64::MAX).max(1)
        };
        tracing::debug!(hz, "calibrated cycle counter");
        Self {
            clock,
            calibration: Calibration { hz },
        }
    }

    /// Current raw counter value
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.raw()
    }

    /// Calibration captured at construction
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }
}

impl std::fmt::Debug for TscClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TscClock")
            .field("hz", &self.calibration.hz)
            .finish()
    }
}

impl Default for TscClock {
    fn default() -> Self {
        Self::new()
    }
}
