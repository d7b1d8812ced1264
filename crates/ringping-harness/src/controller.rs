//! Run controller
//!
//! Orchestrates one measurement run: unit check, echo ring, deadline,
//! pinger launch, echo dispatch on the calling thread, join and summary.

use crate::config::RunConfig;
use crate::context::{RunContext, StopHandle};
use crate::deadline::Deadline;
use crate::echo::{EchoDispatcher, EchoStats};
use crate::error::{EchoError, HarnessError, HarnessResult, PingerError};
use crate::pinger::{Pinger, PingerReport, WorkerStatus};
use crate::protocol::Token;
use crate::units::{self, ExecutionUnits};
use ringping_metrics::HistogramSnapshot;
use ringping_ring::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Minimum units: one dispatcher plus one pinger
const MIN_UNITS: usize = 2;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Histogram state after every worker stopped
    pub snapshot: HistogramSnapshot,
    /// One report per pinger, in token order
    pub workers: Vec<PingerReport>,
    /// Dispatcher result
    pub echo: Result<EchoStats, EchoError>,
}

impl RunOutcome {
    /// True when the dispatcher and every pinger exited cleanly
    pub fn is_clean(&self) -> bool {
        self.echo.is_ok() && self.workers.iter().all(|w| !w.status.is_failure())
    }

    /// Number of pingers that failed
    pub fn failed_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.status.is_failure()).count()
    }

    /// Completed round trips across all pingers
    pub fn round_trips(&self) -> u64 {
        self.workers.iter().map(|w| w.round_trips).sum()
    }

    /// Least favorable status: a dispatcher failure, else the first pinger failure
    pub fn worst_failure(&self) -> Option<String> {
        if let Err(e) = &self.echo {
            return Some(format!("echo dispatcher: {e}"));
        }
        self.workers.iter().find_map(|w| match &w.status {
            WorkerStatus::Failed(e) => Some(format!("{}: {}", w.token, e)),
            WorkerStatus::Stopped => None,
        })
    }
}

/// Drives a single run
pub struct RunController {
    ctx: Arc<RunContext>,
    units: ExecutionUnits,
}

impl RunController {
    /// Controller over the units detected on this machine
    pub fn new(config: RunConfig) -> HarnessResult<Self> {
        Self::with_units(config, ExecutionUnits::detect())
    }

    /// Controller over an explicit set of units
    pub fn with_units(config: RunConfig, units: ExecutionUnits) -> HarnessResult<Self> {
        let ctx = Arc::new(RunContext::new(config)?);
        Ok(Self { ctx, units })
    }

    /// Handle that ends the run from elsewhere
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.ctx))
    }

    /// Clear the running flag on SIGINT.
    ///
    /// Only one handler can be installed per process.
    pub fn install_interrupt_handler(&self) -> HarnessResult<()> {
        let handle = self.stop_handle();
        ctrlc::set_handler(move || handle.stop())?;
        Ok(())
    }

    /// Number of pingers this controller will launch
    pub fn pinger_count(&self) -> usize {
        let spare = self.units.len().saturating_sub(1);
        self.ctx.config().pingers.unwrap_or(spare)
    }

    /// Execute the run to completion
    pub fn run(self) -> HarnessResult<RunOutcome> {
        let config = self.ctx.config().clone();
        let pingers = self.pinger_count();

        let required = MIN_UNITS.max(pingers + 1);
        if self.units.len() < MIN_UNITS || (config.pin_cores && self.units.len() < required) {
            return Err(HarnessError::InsufficientUnits {
                required,
                available: self.units.len(),
            });
        }
        config.validate(pingers)?;

        let (echo_tx, echo_rx) =
            mpsc::channel::<Token>(config.ring.echo_capacity).map_err(HarnessError::EchoQueue)?;

        let calibration = self.ctx.clock().calibration();
        tracing::info!(
            pingers,
            hz = calibration.hz(),
            delay_us = config.delay.as_micros() as u64,
            duration_secs = config.duration.as_secs(),
            "starting run"
        );

        let mut reports = Vec::with_capacity(pingers);
        let mut routes = Vec::with_capacity(pingers);
        let mut ready = Vec::with_capacity(pingers);
        for id in 0..pingers {
            let token = Token::new(id as u32);
            match Pinger::init(token, Arc::clone(&self.ctx), echo_tx.clone()) {
                Ok((pinger, route)) => {
                    routes.push(route);
                    ready.push(pinger);
                }
                Err(e) => {
                    tracing::error!(%token, "pinger init failed: {}", e);
                    reports.push(PingerReport::init_failed(token, e));
                }
            }
        }
        drop(echo_tx);

        if ready.is_empty() {
            self.ctx.stop();
            return Ok(self.finish(reports, Ok(EchoStats::default())));
        }

        let mut dispatcher = match EchoDispatcher::new(echo_rx, routes, config.ring.burst) {
            Ok(d) => d,
            Err(e) => {
                self.ctx.stop();
                return Ok(self.finish(reports, Err(e)));
            }
        };

        tracing::debug!(routes = dispatcher.route_count(), "echo dispatcher ready");

        let deadline = Deadline::arm(config.duration, Arc::clone(&self.ctx))?;

        let pin = config.pin_cores;
        let mut handles = Vec::with_capacity(ready.len());
        for (pinger, core) in ready.into_iter().zip(self.pinger_cores(pingers)) {
            let token = pinger.token();
            let name = token.to_string();
            let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                if pin {
                    units::pin_current(core, "pinger");
                }
                pinger.run()
            });
            match spawned {
                Ok(handle) => handles.push((token, handle)),
                Err(source) => {
                    self.ctx.stop();
                    deadline.disarm();
                    let joined = join_workers(handles);
                    tracing::error!(launched = joined.len(), "cannot launch {}", name);
                    return Err(HarnessError::Spawn { name, source });
                }
            }
        }
        tracing::info!(launched = handles.len(), "pingers launched");

        if pin {
            units::pin_current(self.units.dispatcher(), "echo");
        }
        let echo = dispatcher.run(&self.ctx);
        self.ctx.stop();
        deadline.disarm();

        // the dispatcher keeps both rings alive until every pinger has left
        reports.extend(join_workers(handles));
        drop(dispatcher);
        Ok(self.finish(reports, echo))
    }

    fn pinger_cores(&self, pingers: usize) -> Vec<Option<core_affinity::CoreId>> {
        let cores = self.units.pingers();
        (0..pingers)
            .map(|i| cores.get(i).copied().flatten())
            .collect()
    }

    fn finish(&self, mut reports: Vec<PingerReport>, echo: Result<EchoStats, EchoError>) -> RunOutcome {
        reports.sort_by_key(|r| r.token);

        for report in &reports {
            tracing::debug!(
                token = %report.token,
                round_trips = report.round_trips,
                status = ?report.status,
                "pinger report"
            );
        }
        match &echo {
            Ok(stats) => tracing::info!(
                echoed = stats.echoed,
                bursts = stats.bursts,
                max_burst = stats.max_burst,
                live_routes = stats.live_routes,
                "echo dispatcher finished"
            ),
            Err(e) => tracing::error!("run aborted by echo dispatcher: {}", e),
        }

        RunOutcome {
            snapshot: HistogramSnapshot::from_histogram(self.ctx.histogram()),
            workers: reports,
            echo,
        }
    }
}

fn join_workers(handles: Vec<(Token, JoinHandle<PingerReport>)>) -> Vec<PingerReport> {
    handles
        .into_iter()
        .map(|(token, handle)| {
            handle.join().unwrap_or_else(|_| {
                tracing::error!(%token, "pinger thread panicked");
                PingerReport::init_failed(token, PingerError::Panicked)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringping_metrics::{HistogramConfig, MetricsError};
    use std::time::Duration;

    fn config(duration: Duration, pingers: usize) -> RunConfig {
        RunConfig {
            delay: Duration::ZERO,
            duration,
            pingers: Some(pingers),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_insufficient_units() {
        let controller =
            RunController::with_units(config(Duration::from_millis(10), 1), ExecutionUnits::unpinned(1))
                .unwrap();
        let err = controller.run().unwrap_err();
        assert!(matches!(
            err,
            HarnessError::InsufficientUnits {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_oversized_histogram_is_a_setup_error() {
        let mut config = config(Duration::from_millis(10), 1);
        config.histogram = HistogramConfig {
            bin_width_ns: 1,
            max_latency_ns: u64::MAX,
        };
        let err = RunController::with_units(config, ExecutionUnits::unpinned(2))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            HarnessError::Histogram(MetricsError::TooManyBins { .. })
        ));
    }

    #[test]
    fn test_default_pinger_count() {
        let config = RunConfig::default();
        let controller = RunController::with_units(config, ExecutionUnits::unpinned(4)).unwrap();
        assert_eq!(controller.pinger_count(), 3);
    }

    #[test]
    fn test_too_many_pingers_for_echo_ring() {
        let mut config = config(Duration::from_millis(10), 4);
        config.ring.echo_capacity = 2;
        let controller = RunController::with_units(config, ExecutionUnits::unpinned(2)).unwrap();
        assert!(matches!(controller.run(), Err(HarnessError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_echo_capacity() {
        let mut config = config(Duration::from_millis(10), 1);
        config.ring.echo_capacity = 100;
        let controller = RunController::with_units(config, ExecutionUnits::unpinned(2)).unwrap();
        assert!(matches!(controller.run(), Err(HarnessError::EchoQueue(_))));
    }

    #[test]
    fn test_reply_queue_failure_is_reported_per_worker() {
        let mut config = config(Duration::from_millis(10), 2);
        config.ring.reply_capacity = 3;
        let controller = RunController::with_units(config, ExecutionUnits::unpinned(3)).unwrap();
        let outcome = controller.run().unwrap();
        assert!(!outcome.is_clean());
        assert_eq!(outcome.failed_workers(), 2);
        assert_eq!(outcome.snapshot.summary.samples, 0);
        assert!(outcome.worst_failure().unwrap().contains("reply queue"));
    }

    #[test]
    fn test_short_run() {
        let controller =
            RunController::with_units(config(Duration::from_millis(100), 2), ExecutionUnits::unpinned(3))
                .unwrap();
        let outcome = controller.run().unwrap();
        assert!(outcome.is_clean(), "{:?}", outcome.worst_failure());
        assert_eq!(outcome.workers.len(), 2);
        assert_eq!(outcome.snapshot.summary.samples, outcome.round_trips());
        let stats = outcome.echo.clone().unwrap();
        assert!(stats.echoed >= outcome.round_trips());
        // pingers are joined after the dispatcher loop, so none has left yet
        assert_eq!(stats.live_routes, 2);
    }

    #[test]
    fn test_stop_handle_ends_run_early() {
        let controller = RunController::with_units(
            config(Duration::from_secs(3600), 1),
            ExecutionUnits::unpinned(2),
        )
        .unwrap();
        let handle = controller.stop_handle();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.stop();
        });
        let start = std::time::Instant::now();
        let outcome = controller.run().unwrap();
        stopper.join().unwrap();
        assert!(start.elapsed() < Duration::from_secs(60));
        assert!(outcome.is_clean());
    }
}
