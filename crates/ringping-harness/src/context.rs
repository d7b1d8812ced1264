//! Shared run context: histogram, clock, configuration and running flag

use crate::config::RunConfig;
use crate::error::HarnessResult;
use ringping_metrics::{Histogram, TscClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State shared by the controller, the dispatcher and every pinger
#[derive(Debug)]
pub struct RunContext {
    config: RunConfig,
    histogram: Histogram,
    clock: TscClock,
    running: AtomicBool,
}

impl RunContext {
    /// Build the context; the running flag starts set
    pub fn new(config: RunConfig) -> HarnessResult<Self> {
        let histogram = Histogram::with_config(config.histogram)?;
        Ok(Self {
            config,
            histogram,
            clock: TscClock::new(),
            running: AtomicBool::new(true),
        })
    }

    /// Configuration of this run
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Latency histogram
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Cycle counter
    pub fn clock(&self) -> &TscClock {
        &self.clock
    }

    /// Whether workers should keep going.
    ///
    /// Relaxed: a worker may act on a stale `true` for one more iteration.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Clear the running flag. Returns whether this call did the transition.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::Relaxed)
    }
}

/// Cloneable handle that can end a run from another thread or a signal handler
#[derive(Clone)]
pub struct StopHandle {
    ctx: Arc<RunContext>,
}

impl StopHandle {
    pub(crate) fn new(ctx: Arc<RunContext>) -> Self {
        Self { ctx }
    }

    /// Clear the running flag
    pub fn stop(&self) {
        if self.ctx.stop() {
            tracing::info!("stop requested");
        }
    }

    /// Whether the run is still going
    pub fn is_running(&self) -> bool {
        self.ctx.is_running()
    }
}
